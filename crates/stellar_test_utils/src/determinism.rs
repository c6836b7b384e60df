//! Determinism testing utilities.
//!
//! Provides a harness for verifying that turn generation produces
//! identical games given identical inputs.
//!
//! # Testing Strategy
//!
//! A game replayed from the same seed and the same orders must end in the
//! same state, byte for byte. Sources of non-determinism include:
//!
//! - **Floating-point math**: map positions use fixed-point arithmetic via
//!   [`stellar_core::math::Fixed`].
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized. The
//!   core only iterates ordered collections (`Vec`, `BTreeMap`); hash maps
//!   are lookup indices.
//!
//! - **System randomness**: every random draw comes from the game's
//!   persisted `ChaCha8Rng` or a stream derived from the seed.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual phases (production, movement, discovery)
//! 2. **Property tests**: random inputs still produce deterministic outputs
//! 3. **Integration tests**: full games replayed over several years match
//! 4. **Save/load tests**: a game restored from a snapshot continues identically

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use stellar_core::game::FullGame;
use stellar_core::tech::StandardCatalog;
use stellar_core::turn::TurnGenerator;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns generated per run.
    pub turns: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic game).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the game was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Turn generation is non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a game multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the game
/// * `turns` - Number of turns to generate per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one turn
/// * `hash` - Function to compute a state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..turns {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// Generate one turn with the standard catalog.
///
/// # Panics
///
/// Panics if turn generation fails.
pub fn step_turn(game: &mut FullGame) {
    let catalog = StandardCatalog::new();
    if let Err(err) = TurnGenerator::new(game, &catalog).generate_turn() {
        panic!("turn generation failed in year {}: {err}", game.game.year);
    }
}

/// Hash of a game's full snapshot.
///
/// # Panics
///
/// Panics if the game cannot be serialized.
#[must_use]
pub fn game_hash(game: &FullGame) -> u64 {
    match game.state_hash() {
        Ok(hash) => hash,
        Err(err) => panic!("game could not be hashed: {err}"),
    }
}

/// Replay a game twice from `setup` and compare the final snapshots.
///
/// # Example
///
/// ```ignore
/// use stellar_test_utils::determinism::verify_game_determinism;
/// use stellar_test_utils::fixtures::tiny_game;
///
/// let result = verify_game_determinism(|| tiny_game(42, 2), 10);
/// result.assert_deterministic();
/// ```
pub fn verify_game_determinism<F>(setup: F, turns: u32) -> DeterminismResult
where
    F: Fn() -> FullGame,
{
    verify_determinism(2, turns, setup, step_turn, game_hash)
}

/// Compare two runs turn by turn, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs match throughout, `Some(turn)` if they first differ
/// after that many turns (0 means the setups already differ).
pub fn find_first_divergence<F>(setup: F, turns: u32) -> Option<u32>
where
    F: Fn() -> FullGame,
{
    let mut first = setup();
    let mut second = setup();

    if game_hash(&first) != game_hash(&second) {
        return Some(0);
    }

    for turn in 1..=turns {
        step_turn(&mut first);
        step_turn(&mut second);

        if game_hash(&first) != game_hash(&second) {
            tracing::debug!(turn, year = first.game.year, "runs diverged");
            return Some(turn);
        }
    }

    None
}

/// Verify that a game saved and restored mid-run continues exactly like
/// the original.
pub fn verify_save_load_determinism<F>(setup: F, turns_before: u32, turns_after: u32) -> bool
where
    F: Fn() -> FullGame,
{
    let mut original = setup();
    for _ in 0..turns_before {
        step_turn(&mut original);
    }

    let Ok(bytes) = original.to_bytes() else {
        return false;
    };
    let Ok(mut restored) = FullGame::from_bytes(&bytes) else {
        return false;
    };

    for _ in 0..turns_after {
        step_turn(&mut original);
        step_turn(&mut restored);
    }

    game_hash(&original) == game_hash(&restored)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for simulation inputs.
pub mod strategies {
    use proptest::prelude::*;
    use stellar_core::cost::Cost;
    use stellar_core::race::Hab;
    use stellar_core::rules::Size;

    /// A cost with every dimension in `0..max`.
    pub fn arb_cost(max: i32) -> impl Strategy<Value = Cost> {
        (0..max, 0..max, 0..max, 0..max).prop_map(|(i, b, g, r)| Cost::new(i, b, g, r))
    }

    /// A cost with at least one dimension above zero.
    pub fn arb_nonzero_cost(max: i32) -> impl Strategy<Value = Cost> {
        arb_cost(max).prop_filter("cost must not be free", |c| !c.is_zero())
    }

    /// A habitability triple on the 1..=99 generator scale.
    pub fn arb_hab() -> impl Strategy<Value = Hab> {
        (1..100i32, 1..100i32, 1..100i32).prop_map(|(g, t, r)| Hab::new(g, t, r))
    }

    /// One of the two smallest map sizes.
    pub fn arb_small_size() -> impl Strategy<Value = Size> {
        prop_oneof![Just(Size::Tiny), Just(Size::TinyWide)]
    }

    /// A game seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }
}
