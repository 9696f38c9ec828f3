//! Seeded level generation from registered sections
//!
//! Each pick draws a target difficulty in `difficulty ± variance` and takes
//! the section whose wall density is closest to it. Same seed, same library,
//! same level.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::{LevelError, SectionLibrary};

/// Generator inputs, as authored in level JSON
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateParams {
    pub seed: u64,
    /// Minimum level length in columns
    pub min_length: u32,
    /// Target wall density (0 = open sky, 1 = solid rock)
    pub difficulty: f32,
    #[serde(default = "default_variance")]
    pub variance: f32,
}

fn default_variance() -> f32 {
    0.3
}

/// Pick section names until the level is at least `min_length` columns long
pub fn generate(library: &SectionLibrary, params: &GenerateParams) -> Result<Vec<String>, LevelError> {
    if library.is_empty() {
        return Err(LevelError::NoSections);
    }

    let sections: Vec<(&str, f32, u32)> = library
        .iter()
        .map(|(name, mask)| (name, mask.wall_density(), mask.width() as u32))
        .collect();

    let mut rng = Pcg32::seed_from_u64(params.seed);
    let variance = params.variance.abs();
    let mut names = Vec::new();
    let mut length = 0u32;

    while length < params.min_length || names.is_empty() {
        let target = params.difficulty + rng.random_range(-variance..=variance);
        let mut best = &sections[0];
        for candidate in &sections[1..] {
            if (candidate.1 - target).abs() < (best.1 - target).abs() {
                best = candidate;
            }
        }
        names.push(best.0.to_string());
        length += best.2;
    }

    log::info!(
        "Generated level (seed {}): {} sections, {} columns",
        params.seed,
        names.len(),
        length
    );
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::SectionMask;

    fn library() -> SectionLibrary {
        let mut lib = SectionLibrary::new();
        lib.register("easy", SectionMask::from_ascii("....\n....\n....\n####").unwrap());
        lib.register("mid", SectionMask::from_ascii("#...\n....\n..##\n####").unwrap());
        lib.register("hard", SectionMask::from_ascii("####\n#..#\n#..#\n####").unwrap());
        lib
    }

    fn params(seed: u64) -> GenerateParams {
        GenerateParams {
            seed,
            min_length: 40,
            difficulty: 0.45,
            variance: 0.3,
        }
    }

    #[test]
    fn test_same_seed_same_level() {
        let lib = library();
        assert_eq!(generate(&lib, &params(7)).unwrap(), generate(&lib, &params(7)).unwrap());
    }

    #[test]
    fn test_reaches_min_length() {
        let names = generate(&library(), &params(3)).unwrap();
        assert!(names.len() * 4 >= 40);
        assert!(names.len() * 4 < 44);
    }

    #[test]
    fn test_zero_variance_picks_closest() {
        let p = GenerateParams {
            seed: 1,
            min_length: 8,
            difficulty: 1.0,
            variance: 0.0,
        };
        let names = generate(&library(), &p).unwrap();
        assert_eq!(names, vec!["hard".to_string(), "hard".to_string()]);
    }

    #[test]
    fn test_empty_library() {
        assert_eq!(
            generate(&SectionLibrary::new(), &params(1)),
            Err(LevelError::NoSections)
        );
    }

    #[test]
    fn test_zero_length_still_yields_a_section() {
        let p = GenerateParams {
            min_length: 0,
            ..params(9)
        };
        assert_eq!(generate(&library(), &p).unwrap().len(), 1);
    }
}
