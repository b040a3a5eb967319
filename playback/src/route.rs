use maritime_core::{Coordinates, Mmsi};
use rand::seq::IndexedRandom;
use serde::Deserialize;

use crate::error::{Result, error::RoutePlanningSnafu};

/// What a vessel does after reaching the last waypoint of its route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalWaypoint {
    /// Stay at the final waypoint with zero speed.
    #[default]
    Stop,
    /// Start over from the first waypoint.
    Loop,
}

/// An ordered list of waypoints and a pointer to the one currently steered
/// towards. An empty route means the vessel holds its course and speed.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    waypoints: Vec<Coordinates>,
    next: usize,
}

/// Route handed to the engine by a [`RouteProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedRoute {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub waypoints: Vec<Coordinates>,
}

/// Upstream source of waypoint sequences for vessels added by command.
pub trait RouteProvider: Send + Sync + 'static {
    fn plan(&self, mmsi: Mmsi) -> Result<PlannedRoute>;
}

impl Route {
    pub fn new(waypoints: Vec<Coordinates>) -> Route {
        Route { waypoints, next: 0 }
    }

    /// A route whose first waypoint is the current position.
    pub fn departing(waypoints: Vec<Coordinates>) -> Route {
        Route { waypoints, next: 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn next_waypoint(&self) -> Option<&Coordinates> {
        self.waypoints.get(self.next)
    }

    pub fn remaining(&self) -> usize {
        self.waypoints.len().saturating_sub(self.next)
    }

    /// Moves the pointer past the current waypoint. Returns `true` when that
    /// was the final one.
    pub(crate) fn arrive(&mut self, policy: FinalWaypoint) -> bool {
        self.next += 1;
        if self.next < self.waypoints.len() {
            return false;
        }
        if policy == FinalWaypoint::Loop {
            self.next = 0;
        }
        true
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Port {
    pub name: &'static str,
    pub position: Coordinates,
}

const fn port(name: &'static str, latitude: f64, longitude: f64) -> Port {
    Port {
        name,
        position: Coordinates {
            latitude,
            longitude,
        },
    }
}

pub static PORTS: &[Port] = &[
    port("Shanghai", 31.2304, 121.4737),
    port("Singapore", 1.2833, 103.8333),
    port("Rotterdam", 51.9225, 4.4792),
    port("Busan", 35.1795, 129.0756),
    port("Los Angeles", 33.7395, -118.2618),
    port("Dubai", 25.2697, 55.2868),
    port("Hamburg", 53.5511, 9.9937),
    port("Antwerp", 51.2229, 4.4003),
    port("Tokyo", 35.6545, 139.8344),
    port("Hong Kong", 22.2855, 114.1577),
    port("New York", 40.7128, -74.0060),
    port("Sydney", -33.8688, 151.2093),
    port("Mumbai", 18.9750, 72.8258),
    port("Cape Town", -33.9249, 18.4241),
    port("Rio de Janeiro", -22.9068, -43.1729),
];

/// Sends every new vessel between two distinct, randomly chosen ports.
#[derive(Debug, Clone)]
pub struct PortRoutes {
    ports: &'static [Port],
}

impl Default for PortRoutes {
    fn default() -> Self {
        PortRoutes { ports: PORTS }
    }
}

impl PortRoutes {
    pub fn new(ports: &'static [Port]) -> PortRoutes {
        PortRoutes { ports }
    }
}

impl RouteProvider for PortRoutes {
    fn plan(&self, mmsi: Mmsi) -> Result<PlannedRoute> {
        let mut rng = rand::rng();
        let chosen: Vec<&Port> = self.ports.choose_multiple(&mut rng, 2).collect();

        let [origin, destination] = chosen.as_slice() else {
            return RoutePlanningSnafu {
                mmsi,
                reason: "at least two ports are required",
            }
            .fail();
        };

        Ok(PlannedRoute {
            origin: Some(origin.name.to_string()),
            destination: Some(destination.name.to_string()),
            waypoints: vec![origin.position, destination.position],
        })
    }
}
