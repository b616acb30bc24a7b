//! The `Fleet`: every vehicle of a run plus the bookkeeping that lets each
//! phase visit only the vehicles it concerns.

use tc_core::{Tick, Trip, VehicleId};

use crate::state::{Vehicle, VehicleState};

/// Number of vehicles in each state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub unspawned:   usize,
    pub waiting:     usize,
    pub traveling:   usize,
    pub at_edge_end: usize,
    pub arrived:     usize,
    pub unroutable:  usize,
}

impl StateCounts {
    /// Vehicles spawned and not yet arrived.
    pub fn active(&self) -> usize {
        self.waiting + self.traveling + self.at_edge_end
    }

    pub fn total(&self) -> usize {
        self.unspawned + self.active() + self.arrived + self.unroutable
    }
}

/// All vehicles, indexed by `VehicleId`.
///
/// `vehicles[i]` is built from `trips[i]`.  Spawning walks a copy of the ids
/// sorted by spawn minute (stable, so same-minute vehicles keep demand
/// order); the advance phase walks `active` in ascending `VehicleId` order.
#[derive(Clone, Debug)]
pub struct Fleet {
    pub vehicles: Vec<Vehicle>,
    spawn_order:  Vec<VehicleId>,
    next_spawn:   usize,
    active:       Vec<VehicleId>,
}

impl Fleet {
    pub fn from_trips(trips: &[Trip]) -> Self {
        let vehicles: Vec<Vehicle> = trips
            .iter()
            .enumerate()
            .map(|(i, &trip)| Vehicle::new(VehicleId(i as u32), trip))
            .collect();
        let mut spawn_order: Vec<VehicleId> = vehicles.iter().map(|v| v.id).collect();
        spawn_order.sort_by_key(|id| trips[id.index()].spawn);
        Self { vehicles, spawn_order, next_spawn: 0, active: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    #[inline]
    pub fn get(&self, id: VehicleId) -> &Vehicle {
        &self.vehicles[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: VehicleId) -> &mut Vehicle {
        &mut self.vehicles[id.index()]
    }

    /// Take every not-yet-spawned vehicle whose spawn minute is `<= now`.
    pub fn take_due(&mut self, now: Tick) -> Vec<VehicleId> {
        let start = self.next_spawn;
        while self.next_spawn < self.spawn_order.len()
            && self.vehicles[self.spawn_order[self.next_spawn].index()].trip.spawn <= now
        {
            self.next_spawn += 1;
        }
        self.spawn_order[start..self.next_spawn].to_vec()
    }

    /// Register freshly spawned vehicles for the advance phase.
    pub fn activate(&mut self, ids: impl IntoIterator<Item = VehicleId>) {
        self.active.extend(ids);
        self.active.sort_unstable();
    }

    /// Active vehicles in ascending id order.
    pub fn active_ids(&self) -> &[VehicleId] {
        &self.active
    }

    /// Drop vehicles that are no longer active from the active list.
    pub fn compact(&mut self) {
        let vehicles = &self.vehicles;
        self.active.retain(|id| vehicles[id.index()].state.is_active());
    }

    pub fn counts(&self) -> StateCounts {
        let mut c = StateCounts::default();
        for v in &self.vehicles {
            match v.state {
                VehicleState::Unspawned          => c.unspawned += 1,
                VehicleState::Waiting { .. }     => c.waiting += 1,
                VehicleState::Traveling { .. }   => c.traveling += 1,
                VehicleState::AtEdgeEnd { .. }   => c.at_edge_end += 1,
                VehicleState::Arrived { .. }     => c.arrived += 1,
                VehicleState::Unroutable         => c.unroutable += 1,
            }
        }
        c
    }
}
