use super::*;

use itertools::Itertools;
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;


/// Return the masking function for a given pattern index in 0..8. The returned
/// function tells for the module at column x and row y whether it meets the
/// masking condition.
pub fn get_masking_function(pattern_index: u8) -> Box<dyn Fn(usize, usize) -> bool> {
    match pattern_index & 0b111 {
        0b000 => Box::new(| x,  y| { (x + y) % 2 == 0 }),
        0b001 => Box::new(|_x,  y| { y % 2 == 0 }),
        0b010 => Box::new(| x, _y| { x % 3 == 0 }),
        0b011 => Box::new(| x,  y| { (x + y) % 3 == 0 }),
        0b100 => Box::new(| x,  y| { (y / 2 + x / 3) % 2 == 0 }),
        0b101 => Box::new(| x,  y| { (x * y) % 2 + (x * y) % 3 == 0 }),
        0b110 => Box::new(| x,  y| { ((x * y) % 2 + (x * y) % 3) % 2 == 0 }),
        _     => Box::new(| x,  y| { ((x + y) % 2 + (x * y) % 3) % 2 == 0 }),
    }
}


/// apply mask to the encoding region of the given symbol. Function modules are
/// never touched.
pub fn apply_mask(symbol: &mut Canvas, pattern: u8) {
    let pattern_func = get_masking_function(pattern);
    let size = symbol.size;

    for (i, module) in symbol.modules.iter_mut().enumerate() {
        // flipping the bit where the mask bit is 1 is a XOR between mask and value bits
        if let Module::Data(dark) = *module {
            if pattern_func(i % size, i / size) {
                *module = Module::Data(!dark);
            }
        }
    }
}

const PENALTY_N1: u32 = 3;
const PENALTY_N2: u32 = 3;
const PENALTY_N3: u32 = 40;
const PENALTY_N4: u32 = 10;

/// dark-light-dark-dark-dark-light-dark, the 1:1:3:1:1 ratio of a finder pattern
const FINDER_LIKE: [bool; 7] = [true, false, true, true, true, false, true];

/// N1: each run of five or more same coloured modules in a line
fn score_runs(line: &[bool]) -> u32 {
    line.iter()
        .dedup_with_count()
        .filter(|&(run, _)| run >= 5)
        .map(|(run, _)| PENALTY_N1 + (run - 5) as u32)
        .sum()
}

/// N3: each finder-like sequence with four light modules on either side. Only modules
/// inside the symbol count as light.
fn score_finder_like(line: &[bool]) -> u32 {
    let all_light = |range: std::ops::Range<usize>| line[range].iter().all(|&dark| !dark);

    line.windows(FINDER_LIKE.len())
        .enumerate()
        .filter(|&(_, window)| window == FINDER_LIKE)
        .filter(|&(i, _)| {
            let end = i + FINDER_LIKE.len();
            (i >= 4 && all_light(i - 4..i)) || (end + 4 <= line.len() && all_light(end..end + 4))
        })
        .count() as u32 * PENALTY_N3
}

/// Compute the penalty score of a masked symbol, including its function patterns.
pub fn compute_mask_penalty_score(masked_symbol: &Canvas) -> u32 {
    let size = masked_symbol.size;
    let bits = masked_symbol.to_bits();
    let rows: Vec<&[bool]> = bits.chunks(size).collect();
    let columns: Vec<Vec<bool>> = (0..size)
        .map(|x| rows.iter().map(|row| row[x]).collect())
        .collect();
    let lines = || rows.iter().copied().chain(columns.iter().map(|c| c.as_slice()));

    // FIRST feature: adjacent modules of same color in rows and columns
    let mut score: u32 = lines().map(score_runs).sum();

    // SECOND FEATURE: penalties for 2x2 module blocks of same color
    for (a, b) in rows.iter().tuple_windows() {
        score += (0..size - 1)
            .filter(|&x| a[x] == a[x + 1] && a[x] == b[x] && a[x] == b[x + 1])
            .count() as u32 * PENALTY_N2;
    }

    // THIRD FEATURE: 1011101 patterns with 4 light modules before or after
    score += lines().map(score_finder_like).sum::<u32>();

    // FOURTH FEATURE: dark/light ratio balance, in whole 5% steps away from 50%
    let total = bits.len();
    let dark = bits.iter().filter(|&&b| b).count();
    let steps = (dark * 100).abs_diff(total * 50) / (total * 5);
    score += PENALTY_N4 * steps as u32;

    score
}

struct MaskTrial {
    pattern: u8,
    symbol: Canvas,
    score: u32,
}

/// Mask a copy of the symbol, stamp format and version information for that
/// mask and score it
fn run_mask_trial(unmasked_symbol: &Canvas, info: &VersionInfo, pattern: u8) -> MaskTrial {
    let mut symbol = unmasked_symbol.clone();
    apply_mask(&mut symbol, pattern);
    insert_format_info(&mut symbol, pattern);
    insert_version_info(&mut symbol, info);
    let score = compute_mask_penalty_score(&symbol);
    trace!(mask = pattern, score, "scored mask candidate");
    MaskTrial { pattern, symbol, score }
}

/// Compute best mask and apply it.
/// Will evaluate all eight masks for the given symbol and return the code of the mask with
/// the lowest penalty together with the finished symbol, format and version information
/// included. Ties go to the lower mask index.
pub fn apply_best_mask(unmasked_symbol: &Canvas, info: &VersionInfo) -> (u8, Canvas) {
    let trial = |pattern: u8| run_mask_trial(unmasked_symbol, info, pattern);

    let first = trial(0);

    #[cfg(feature = "parallel")]
    let rest = (1..8u8).into_par_iter().map(trial).min_by_key(|t| t.score);
    #[cfg(not(feature = "parallel"))]
    let rest = (1..8u8).map(trial).min_by_key(|t| t.score);

    let best = match rest {
        Some(t) if t.score < first.score => t,
        _ => first,
    };
    debug!(mask = best.pattern, score = best.score, "selected mask pattern");
    (best.pattern, best.symbol)
}
