use chrono::{DateTime, Utc};
use maritime_core::{
    Coordinates, Mmsi, NewPositionReport,
    geo::{destination, distance_nm, initial_bearing, normalize_degrees},
};

use crate::route::{FinalWaypoint, Route};

/// Upper bound on waypoints passed within a single tick, keeps a tick bounded
/// even for degenerate routes.
const MAX_WAYPOINTS_PER_TICK: usize = 64;

/// Kinematic state of a vessel owned by the playback engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedVessel {
    pub mmsi: Mmsi,
    pub name: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub position: Coordinates,
    /// Knots.
    pub speed: f64,
    pub course: f64,
    pub heading: Option<f64>,
    pub route: Route,
}

/// Parameters for moving vessels along their routes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Navigation {
    pub arrival_tolerance_nm: f64,
    pub final_waypoint: FinalWaypoint,
}

impl Default for Navigation {
    fn default() -> Self {
        Navigation {
            arrival_tolerance_nm: 0.5,
            final_waypoint: FinalWaypoint::Stop,
        }
    }
}

impl SimulatedVessel {
    /// A vessel starting at the first waypoint and steering towards the
    /// second one.
    pub fn on_route(mmsi: Mmsi, speed: f64, waypoints: Vec<Coordinates>) -> Option<SimulatedVessel> {
        let start = *waypoints.first()?;
        let course = waypoints
            .get(1)
            .map(|next| initial_bearing(&start, next))
            .unwrap_or_default();

        Some(SimulatedVessel {
            mmsi,
            name: None,
            origin: None,
            destination: None,
            position: start,
            speed,
            course,
            heading: Some(course),
            route: Route::departing(waypoints),
        })
    }

    /// A vessel holding a constant course and speed.
    pub fn free_running(mmsi: Mmsi, position: Coordinates, speed: f64, course: f64) -> SimulatedVessel {
        let course = normalize_degrees(course);
        SimulatedVessel {
            mmsi,
            name: None,
            origin: None,
            destination: None,
            position,
            speed,
            course,
            heading: Some(course),
            route: Route::new(vec![]),
        }
    }

    /// Advances the vessel by `elapsed_hours` of simulated time.
    pub fn advance(&mut self, elapsed_hours: f64, navigation: &Navigation) {
        let mut budget = self.speed * elapsed_hours;

        if self.route.is_empty() {
            self.position = destination(&self.position, self.course, budget);
            return;
        }

        for _ in 0..MAX_WAYPOINTS_PER_TICK {
            let Some(target) = self.route.next_waypoint().copied() else {
                break;
            };

            let remaining = distance_nm(&self.position, &target);

            if remaining <= navigation.arrival_tolerance_nm || remaining <= budget {
                if remaining <= budget {
                    self.position = target;
                    budget -= remaining;
                }
                if self.route.arrive(navigation.final_waypoint)
                    && navigation.final_waypoint == FinalWaypoint::Stop
                {
                    self.speed = 0.0;
                    break;
                }
                if let Some(next) = self.route.next_waypoint() {
                    self.set_course(initial_bearing(&self.position, next));
                }
                if budget <= 0.0 {
                    break;
                }
            } else {
                self.set_course(initial_bearing(&self.position, &target));
                self.position = destination(&self.position, self.course, budget);
                break;
            }
        }
    }

    pub fn report(&self, timestamp: DateTime<Utc>) -> NewPositionReport {
        NewPositionReport {
            mmsi: self.mmsi,
            timestamp,
            latitude: self.position.latitude,
            longitude: self.position.longitude,
            speed: self.speed,
            course: self.course,
            heading: self.heading,
        }
    }

    fn set_course(&mut self, course: f64) {
        self.course = normalize_degrees(course);
        self.heading = Some(self.course);
    }
}
