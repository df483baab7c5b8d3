//! Input arrays, given on the command line or generated from a preset

use clap::{Args, ValueEnum};
use rand::Rng;

/// Smallest generated value
pub const MIN_VALUE: i64 = 1;
/// Largest generated value
pub const MAX_VALUE: i64 = 100;
/// Generated array length when `--size` is not given
pub const DEFAULT_SIZE: u16 = 20;

/// Shape of a generated array
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    /// Uniformly random values
    Random,
    /// Ascending
    Sorted,
    /// Descending
    Reversed,
    /// Ascending with a tenth of the positions swapped at random
    Nearly,
}

impl Preset {
    /// Generate `size` values in `MIN_VALUE..=MAX_VALUE`.
    pub fn generate<R: Rng + ?Sized>(self, size: usize, rng: &mut R) -> Vec<i64> {
        let mut values: Vec<i64> = (0..size)
            .map(|_| rng.gen_range(MIN_VALUE..=MAX_VALUE))
            .collect();

        match self {
            Preset::Random => {}
            Preset::Sorted => values.sort_unstable(),
            Preset::Reversed => values.sort_unstable_by(|a, b| b.cmp(a)),
            Preset::Nearly => {
                values.sort_unstable();
                for _ in 0..size / 10 {
                    let a = rng.gen_range(0..size);
                    let b = rng.gen_range(0..size);
                    values.swap(a, b);
                }
            }
        }
        values
    }
}

/// A preset plus the length to generate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Generator {
    pub preset: Preset,
    pub size: usize,
}

impl Generator {
    /// Fresh array from the thread-local RNG
    pub fn generate(&self) -> Vec<i64> {
        self.preset.generate(self.size, &mut rand::thread_rng())
    }
}

/// Exactly one of `--array` or `--preset`
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ArraySource {
    /// Input values, comma separated
    #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
    pub array: Option<Vec<i64>>,

    /// Generate the input instead
    #[arg(short, long, value_enum)]
    pub preset: Option<Preset>,
}

#[derive(Args, Debug)]
pub struct InputArgs {
    #[command(flatten)]
    pub source: ArraySource,

    /// Number of values to generate with --preset
    #[arg(long, default_value_t = DEFAULT_SIZE, value_parser = clap::value_parser!(u16).range(1..=200))]
    pub size: u16,
}

impl InputArgs {
    /// The generator, when the array is not given explicitly.
    pub fn generator(&self) -> Option<Generator> {
        self.source.preset.map(|preset| Generator {
            preset,
            size: usize::from(self.size),
        })
    }

    /// The array for the first run.
    pub fn initial_array(&self) -> Vec<i64> {
        match (&self.source.array, self.generator()) {
            (Some(array), _) => array.clone(),
            (None, Some(generator)) => generator.generate(),
            (None, None) => Vec::new(),
        }
    }
}
