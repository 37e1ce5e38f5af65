use std::{collections::HashSet, sync::Arc};

use rand::Rng;

use super::models::{clamp_humidity, round_tenths, BaseRoom, RoomReading};

/// Maximum temperature deviation from the base reading, degrees Celsius.
pub const TEMPERATURE_JITTER_C: f64 = 1.5;
/// Maximum humidity deviation from the base reading, percentage points.
pub const HUMIDITY_JITTER: i32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("duplicate room id {0} in base table")]
    DuplicateRoomId(u32),
    #[error("room {id} has a non-finite base temperature {temperature}")]
    NonFiniteTemperature { id: u32, temperature: f64 },
}

/// Produces room snapshots from an immutable base table.
///
/// Live snapshots always perturb the base readings, never the previous
/// snapshot, so repeated calls cannot drift.
#[derive(Debug, Clone)]
pub struct ReadingGenerator {
    base: Arc<[BaseRoom]>,
}

impl ReadingGenerator {
    pub fn new(base: Vec<BaseRoom>) -> Result<Self, GeneratorError> {
        let mut seen = HashSet::with_capacity(base.len());
        for room in &base {
            if !seen.insert(room.id) {
                return Err(GeneratorError::DuplicateRoomId(room.id));
            }
            if !room.temperature.is_finite() {
                return Err(GeneratorError::NonFiniteTemperature {
                    id: room.id,
                    temperature: room.temperature,
                });
            }
        }
        Ok(Self { base: base.into() })
    }

    /// The eight classrooms the dashboard ships with.
    pub fn with_reference_rooms() -> Self {
        Self {
            base: reference_rooms().into(),
        }
    }

    pub fn base(&self) -> &[BaseRoom] {
        &self.base
    }

    /// Base readings as-is, with comfort computed.
    pub fn snapshot(&self) -> Vec<RoomReading> {
        self.base.iter().map(RoomReading::from).collect()
    }

    /// Independently perturbed readings using the thread-local RNG.
    pub fn live_snapshot(&self) -> Vec<RoomReading> {
        self.live_snapshot_with(&mut rand::rng())
    }

    pub fn live_snapshot_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<RoomReading> {
        self.base.iter().map(|base| perturb(base, rng)).collect()
    }
}

fn perturb<R: Rng + ?Sized>(base: &BaseRoom, rng: &mut R) -> RoomReading {
    let delta = rng.random_range(-TEMPERATURE_JITTER_C..=TEMPERATURE_JITTER_C);
    // Rounding can push a base value with more than one decimal past the
    // jitter bound; pull it back inside.
    let temperature = round_tenths(base.temperature + delta).clamp(
        base.temperature - TEMPERATURE_JITTER_C,
        base.temperature + TEMPERATURE_JITTER_C,
    );

    let humidity_delta = rng.random_range(-HUMIDITY_JITTER..=HUMIDITY_JITTER);
    let humidity = clamp_humidity(i32::from(base.humidity) + humidity_delta);

    RoomReading::new(base.id, base.name.clone(), temperature, humidity)
}

fn reference_rooms() -> Vec<BaseRoom> {
    vec![
        BaseRoom::new(1, "Room 101", 23.5, 55),
        BaseRoom::new(2, "Room 102", 27.2, 62),
        BaseRoom::new(3, "Room 103", 31.8, 70),
        BaseRoom::new(4, "Room 104", 22.1, 48),
        BaseRoom::new(5, "Room 105", 26.5, 58),
        BaseRoom::new(6, "Room 106", 29.4, 65),
        BaseRoom::new(7, "Room 107", 24.0, 52),
        BaseRoom::new(8, "Room 108", 28.1, 60),
    ]
}
