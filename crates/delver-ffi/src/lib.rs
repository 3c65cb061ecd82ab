//! C FFI bindings for the Delver dungeon generator
//!
//! This crate provides a C-compatible API so game engines (Godot, Unity,
//! Unreal, or anything with C FFI support) can drive generation and receive
//! placements through callbacks.
//!
//! # Basic Usage (C)
//! ```c
//! #include "delver.h"
//!
//! DelverCallbacks cb = { my_context, spawn_room, spawn_corridor, destroy_placement };
//! DelverHandle gen = delver_create(&cb);
//!
//! DelverConfig config;
//! delver_default_config(&config);
//! config.has_seed = 1;
//! config.seed = 42;
//! if (delver_generate(gen, &config) == DELVER_STATUS_OK) {
//!     uint32_t count = delver_room_count(gen);
//!     for (uint32_t i = 0; i < count; i++) {
//!         DelverRoom room;
//!         if (delver_get_room(gen, i, &room)) {
//!             // room.x, room.y, room.half_x, room.half_y, room.placement ...
//!         }
//!     }
//! }
//!
//! // Cleanup (destroys every placement through the callbacks)
//! delver_clear(gen);
//! delver_destroy(gen);
//! ```

use std::ffi::c_void;

use delver_core::engine::{DungeonGenerator, Phase};
use delver_core::error::GenerationError;
use delver_core::provider::{PlacementError, PlacementId, PlacementProvider};
use delver_logic::config::DungeonConfig;
use delver_logic::corridors::{GapPolicy, WalkOrder};
use delver_logic::geometry::{Extent, Point};
use delver_logic::separation::{ForceScaling, SeparationMode};

/// Spawn a room footprint. Return a non-zero placement id, or 0 to reject.
pub type DelverSpawnRoomFn = Option<
    extern "C" fn(
        user_data: *mut c_void,
        x: f64,
        y: f64,
        z: f64,
        half_x: f64,
        half_y: f64,
        half_z: f64,
    ) -> u64,
>;

/// Spawn a corridor segment. Return a non-zero placement id, or 0 to reject.
pub type DelverSpawnCorridorFn = Option<extern "C" fn(user_data: *mut c_void, x: f64, y: f64, z: f64) -> u64>;

/// Remove a placement previously returned by a spawn callback.
pub type DelverDestroyFn = Option<extern "C" fn(user_data: *mut c_void, placement: u64)>;

/// Host callbacks. Any callback may be null; a null spawn callback accepts
/// every placement and the generator numbers them itself.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DelverCallbacks {
    /// Passed back verbatim to every callback
    pub user_data: *mut c_void,
    pub spawn_room: DelverSpawnRoomFn,
    pub spawn_corridor: DelverSpawnCorridorFn,
    pub destroy: DelverDestroyFn,
}

/// Generation parameters. Enum fields use the numeric values documented on
/// each field.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct DelverConfig {
    pub cell_count: u32,
    pub min_size: f64,
    pub max_size: f64,
    pub cell_height: f64,
    pub spawn_radius: f64,
    pub neighbor_radius: f64,
    pub push_distance: f64,
    pub min_distance: f64,
    pub max_attempts: u32,
    pub max_passes: u32,
    /// 0 = sequential, 1 = simultaneous
    pub separation_mode: u8,
    /// 0 = own extent, 1 = neighbor extent
    pub force_scaling: u8,
    pub room_threshold: f64,
    pub retain_probability: f64,
    pub section_length: f64,
    pub snap_size: f64,
    pub loop_probability: f64,
    /// 0 = Y first, 1 = X first
    pub walk_order: u8,
    /// 0 = leave gaps, 1 = bridge the remainder
    pub gap_policy: u8,
    /// 1 to use `seed`, 0 for a fresh random seed
    pub has_seed: u8,
    pub seed: u64,
}

/// Result of generate/begin calls
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelverStatus {
    Ok = 0,
    InvalidConfig = 1,
    AlreadyGenerated = 2,
    NullPointer = 3,
}

/// Generator phase as seen from C
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelverPhase {
    Idle = 0,
    Spawning = 1,
    Separating = 2,
    Connecting = 3,
    Done = 4,
}

/// Room data returned to C
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct DelverRoom {
    /// Index of this room (0 to room_count-1)
    pub index: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub half_x: f64,
    pub half_y: f64,
    pub half_z: f64,
    /// Placement id from the host, 0 if the host rejected it
    pub placement: u64,
}

/// Corridor segment data returned to C
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct DelverCorridor {
    pub index: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub placement: u64,
}

/// Placement provider that forwards to C callbacks.
pub struct CallbackProvider {
    callbacks: DelverCallbacks,
    next_id: u64,
}

impl CallbackProvider {
    fn new(callbacks: DelverCallbacks) -> Self {
        Self {
            callbacks,
            next_id: 0,
        }
    }

    fn local_id(&mut self) -> PlacementId {
        self.next_id += 1;
        PlacementId(self.next_id)
    }
}

impl PlacementProvider for CallbackProvider {
    fn spawn_room(&mut self, center: Point, half_extent: Extent) -> Result<PlacementId, PlacementError> {
        let Some(spawn) = self.callbacks.spawn_room else {
            return Ok(self.local_id());
        };
        match spawn(
            self.callbacks.user_data,
            center.x,
            center.y,
            center.z,
            half_extent.x,
            half_extent.y,
            half_extent.z,
        ) {
            0 => Err(PlacementError::rejected_at(&center)),
            id => Ok(PlacementId(id)),
        }
    }

    fn spawn_corridor(&mut self, location: Point) -> Result<PlacementId, PlacementError> {
        let Some(spawn) = self.callbacks.spawn_corridor else {
            return Ok(self.local_id());
        };
        match spawn(self.callbacks.user_data, location.x, location.y, location.z) {
            0 => Err(PlacementError::rejected_at(&location)),
            id => Ok(PlacementId(id)),
        }
    }

    fn destroy(&mut self, id: PlacementId) {
        if let Some(destroy) = self.callbacks.destroy {
            destroy(self.callbacks.user_data, id.0);
        }
    }
}

/// Opaque handle to a generator
pub type DelverHandle = *mut DungeonGenerator<CallbackProvider>;

impl From<&DelverConfig> for DungeonConfig {
    fn from(c: &DelverConfig) -> Self {
        DungeonConfig {
            cell_count: c.cell_count as usize,
            min_size: c.min_size,
            max_size: c.max_size,
            cell_height: c.cell_height,
            spawn_radius: c.spawn_radius,
            neighbor_radius: c.neighbor_radius,
            push_distance: c.push_distance,
            min_distance: c.min_distance,
            max_attempts: c.max_attempts,
            max_passes: c.max_passes,
            separation_mode: if c.separation_mode == 1 {
                SeparationMode::Simultaneous
            } else {
                SeparationMode::Sequential
            },
            force_scaling: if c.force_scaling == 1 {
                ForceScaling::NeighborExtent
            } else {
                ForceScaling::OwnExtent
            },
            room_threshold: c.room_threshold,
            retain_probability: c.retain_probability,
            section_length: c.section_length,
            snap_size: c.snap_size,
            loop_probability: c.loop_probability,
            walk_order: if c.walk_order == 1 {
                WalkOrder::XFirst
            } else {
                WalkOrder::YFirst
            },
            gap_policy: if c.gap_policy == 1 {
                GapPolicy::Bridge
            } else {
                GapPolicy::Leave
            },
            seed: (c.has_seed != 0).then_some(c.seed),
        }
    }
}

impl From<&DungeonConfig> for DelverConfig {
    fn from(c: &DungeonConfig) -> Self {
        DelverConfig {
            cell_count: c.cell_count as u32,
            min_size: c.min_size,
            max_size: c.max_size,
            cell_height: c.cell_height,
            spawn_radius: c.spawn_radius,
            neighbor_radius: c.neighbor_radius,
            push_distance: c.push_distance,
            min_distance: c.min_distance,
            max_attempts: c.max_attempts,
            max_passes: c.max_passes,
            separation_mode: (c.separation_mode == SeparationMode::Simultaneous) as u8,
            force_scaling: (c.force_scaling == ForceScaling::NeighborExtent) as u8,
            room_threshold: c.room_threshold,
            retain_probability: c.retain_probability,
            section_length: c.section_length,
            snap_size: c.snap_size,
            loop_probability: c.loop_probability,
            walk_order: (c.walk_order == WalkOrder::XFirst) as u8,
            gap_policy: (c.gap_policy == GapPolicy::Bridge) as u8,
            has_seed: c.seed.is_some() as u8,
            seed: c.seed.unwrap_or_default(),
        }
    }
}

impl From<Phase> for DelverPhase {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Idle => DelverPhase::Idle,
            Phase::Spawning => DelverPhase::Spawning,
            Phase::Separating => DelverPhase::Separating,
            Phase::Connecting => DelverPhase::Connecting,
            Phase::Done => DelverPhase::Done,
        }
    }
}

fn status_of<T>(result: Result<T, GenerationError>) -> DelverStatus {
    match result {
        Ok(_) => DelverStatus::Ok,
        Err(GenerationError::InvalidConfig(_)) => DelverStatus::InvalidConfig,
        Err(GenerationError::AlreadyGenerated) => DelverStatus::AlreadyGenerated,
    }
}

// ============================================================================
// Lifecycle Functions
// ============================================================================

/// Create a new generator placing through `callbacks` (may be null)
///
/// Returns a handle that must be freed with `delver_destroy`
#[no_mangle]
pub extern "C" fn delver_create(callbacks: *const DelverCallbacks) -> DelverHandle {
    let callbacks = if callbacks.is_null() {
        DelverCallbacks {
            user_data: std::ptr::null_mut(),
            spawn_room: None,
            spawn_corridor: None,
            destroy: None,
        }
    } else {
        unsafe { *callbacks }
    };
    Box::into_raw(Box::new(DungeonGenerator::new(CallbackProvider::new(callbacks))))
}

/// Destroy a generator and free its memory
///
/// Placements are not destroyed; call `delver_clear` first if needed.
#[no_mangle]
pub extern "C" fn delver_destroy(handle: DelverHandle) {
    if !handle.is_null() {
        unsafe {
            drop(Box::from_raw(handle));
        }
    }
}

/// Fill `out` with the default configuration
#[no_mangle]
pub extern "C" fn delver_default_config(out: *mut DelverConfig) -> bool {
    if out.is_null() {
        return false;
    }
    unsafe {
        *out = DelverConfig::from(&DungeonConfig::default());
    }
    true
}

// ============================================================================
// Generation Control
// ============================================================================

/// Run the full pipeline
///
/// Fails with `InvalidConfig` before any callback fires if the configuration
/// is invalid, and with `AlreadyGenerated` until `delver_clear` is called.
#[no_mangle]
pub extern "C" fn delver_generate(handle: DelverHandle, config: *const DelverConfig) -> DelverStatus {
    if handle.is_null() || config.is_null() {
        return DelverStatus::NullPointer;
    }
    let generator = unsafe { &mut *handle };
    let config = DungeonConfig::from(unsafe { &*config });
    status_of(generator.generate(config))
}

/// Start a run without doing any work; advance it with `delver_step`
#[no_mangle]
pub extern "C" fn delver_begin(handle: DelverHandle, config: *const DelverConfig) -> DelverStatus {
    if handle.is_null() || config.is_null() {
        return DelverStatus::NullPointer;
    }
    let generator = unsafe { &mut *handle };
    let config = DungeonConfig::from(unsafe { &*config });
    status_of(generator.begin(config))
}

/// Do one unit of work and return the phase reached
#[no_mangle]
pub extern "C" fn delver_step(handle: DelverHandle) -> DelverPhase {
    if handle.is_null() {
        return DelverPhase::Idle;
    }
    let generator = unsafe { &mut *handle };
    generator.step().into()
}

/// Destroy every placement through the callbacks and reset to idle
#[no_mangle]
pub extern "C" fn delver_clear(handle: DelverHandle) {
    if handle.is_null() {
        return;
    }
    let generator = unsafe { &mut *handle };
    generator.clear();
}

// ============================================================================
// Query Functions
// ============================================================================

/// Current phase
#[no_mangle]
pub extern "C" fn delver_phase(handle: DelverHandle) -> DelverPhase {
    if handle.is_null() {
        return DelverPhase::Idle;
    }
    let generator = unsafe { &*handle };
    generator.phase().into()
}

/// Seed of the most recent run
///
/// Returns false if nothing has been generated yet
#[no_mangle]
pub extern "C" fn delver_last_seed(handle: DelverHandle, seed: *mut u64) -> bool {
    if handle.is_null() || seed.is_null() {
        return false;
    }
    let generator = unsafe { &*handle };
    match generator.last_seed() {
        Some(s) => {
            unsafe {
                *seed = s;
            }
            true
        }
        None => false,
    }
}

/// Number of kept rooms, placed or rejected
#[no_mangle]
pub extern "C" fn delver_room_count(handle: DelverHandle) -> u32 {
    if handle.is_null() {
        return 0;
    }
    let generator = unsafe { &*handle };
    generator.rooms().len() as u32
}

/// Get room data by index
///
/// Returns true if successful, false if index out of bounds
#[no_mangle]
pub extern "C" fn delver_get_room(handle: DelverHandle, index: u32, room: *mut DelverRoom) -> bool {
    if handle.is_null() || room.is_null() {
        return false;
    }
    let generator = unsafe { &*handle };
    let Some(placed) = generator.rooms().get(index as usize) else {
        return false;
    };
    let Some(cell) = generator.cells().get(placed.cell) else {
        return false;
    };

    let out = unsafe { &mut *room };
    *out = DelverRoom {
        index,
        x: cell.position.x,
        y: cell.position.y,
        z: cell.position.z,
        half_x: cell.half_extent.x,
        half_y: cell.half_extent.y,
        half_z: cell.half_extent.z,
        placement: placed.id.map_or(0, |id| id.0),
    };
    true
}

/// Number of placed corridor segments
#[no_mangle]
pub extern "C" fn delver_corridor_count(handle: DelverHandle) -> u32 {
    if handle.is_null() {
        return 0;
    }
    let generator = unsafe { &*handle };
    generator.corridors().len() as u32
}

/// Get corridor segment data by index
///
/// Returns true if successful, false if index out of bounds
#[no_mangle]
pub extern "C" fn delver_get_corridor(
    handle: DelverHandle,
    index: u32,
    corridor: *mut DelverCorridor,
) -> bool {
    if handle.is_null() || corridor.is_null() {
        return false;
    }
    let generator = unsafe { &*handle };
    let Some(placed) = generator.corridors().get(index as usize) else {
        return false;
    };

    let out = unsafe { &mut *corridor };
    *out = DelverCorridor {
        index,
        x: placed.location.x,
        y: placed.location.y,
        z: placed.location.z,
        placement: placed.id.0,
    };
    true
}
