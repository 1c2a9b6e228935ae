//! Live OSRM routing against a prepared dataset.
//!
//! Needs Docker and an OSRM `mld` dataset under `OSRM_DATA_DIR` (default
//! `osrm-data`) named `OSRM_DATASET` (default `us-latest.osrm`). Run with
//! `cargo test -- --ignored`.

mod fixtures;

use std::env;

use testcontainers::core::{IntoContainerPort, Mount};
use testcontainers::ReuseDirective;
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, TestcontainersError};

use fixtures::*;
use roadtrip_planner::cache::InMemoryRouteCache;
use roadtrip_planner::osrm::{OsrmClient, OsrmConfig};
use roadtrip_planner::planner::plan_active_scenario;
use roadtrip_planner::traits::{RouteLeg, RouteProvider};

fn osrm_container() -> Result<(Container<GenericImage>, String), TestcontainersError> {
    let data_dir = env::var("OSRM_DATA_DIR").unwrap_or_else(|_| "osrm-data".to_string());
    let dataset = env::var("OSRM_DATASET").unwrap_or_else(|_| "us-latest.osrm".to_string());
    let data_dir = std::fs::canonicalize(&data_dir)
        .map_err(|err| TestcontainersError::other(format!("OSRM data dir {}: {}", data_dir, err)))?;

    let image = GenericImage::new("osrm/osrm-backend", "latest")
        .with_exposed_port(5000.tcp())
        .with_mount(Mount::bind_mount(data_dir.to_string_lossy().to_string(), "/data"))
        .with_cmd(vec![
            "osrm-routed".to_string(),
            "--algorithm".to_string(),
            "mld".to_string(),
            format!("/data/{}", dataset),
        ])
        .with_container_name("osrm-roadtrip-mld")
        .with_startup_timeout(std::time::Duration::from_secs(120))
        .with_reuse(ReuseDirective::Always);

    let container = image.start()?;
    let port = container.get_host_port_ipv4(5000.tcp())?;
    let base_url = format!("http://127.0.0.1:{}", port);

    Ok((container, base_url))
}

/// OSRM answers before its data is loaded; retry for a while.
fn route_with_retry(client: &OsrmClient, waypoints: &[roadtrip_planner::model::LatLng]) -> Vec<RouteLeg> {
    let start = std::time::Instant::now();
    loop {
        match client.route(waypoints) {
            Ok(legs) => return legs,
            Err(err) if start.elapsed() < std::time::Duration::from_secs(60) => {
                eprintln!("OSRM not ready: {}", err);
                std::thread::sleep(std::time::Duration::from_millis(500));
            }
            Err(err) => panic!("OSRM route failed: {}", err),
        }
    }
}

#[test]
#[ignore = "needs Docker and a prepared OSRM dataset"]
fn osrm_route_returns_one_leg_per_hop() {
    let (container, base_url) = osrm_container().expect("start OSRM container");

    let client = OsrmClient::new(OsrmConfig {
        base_url,
        profile: "car".to_string(),
        timeout_secs: 30,
    })
    .expect("build OSRM client");

    let waypoints = vec![COLORADO_BEND.lat_lng(), ANNAPOLIS.lat_lng(), HOUSTON.lat_lng()];
    let legs = route_with_retry(&client, &waypoints);

    assert_eq!(legs.len(), 2);
    for leg in &legs {
        let hours = leg.duration_sec.unwrap_or_default() / 3600.0;
        assert!(hours > 15.0 && hours < 40.0, "implausible drive of {:.1}h", hours);
        assert!(leg.distance_meters.unwrap_or_default() > 1_500_000.0);
    }

    drop(container);
}

#[test]
#[ignore = "needs Docker and a prepared OSRM dataset"]
fn osrm_backed_plan_fits_window() {
    let (container, base_url) = osrm_container().expect("start OSRM container");

    let client = OsrmClient::new(OsrmConfig {
        base_url,
        ..OsrmConfig::default()
    })
    .expect("build OSRM client");
    route_with_retry(&client, &[HOUSTON.lat_lng(), ANNAPOLIS.lat_lng()]);

    let trip = TripBuilder::new("2026-01-10", "2026-01-19")
        .anchors(&[ANNAPOLIS.id, LAKE_HOUSE.id])
        .build();
    let plan = plan_active_scenario(&trip, &client, &InMemoryRouteCache::new()).expect("plan trip");

    assert_eq!(plan.legs.len(), 3);
    assert!(!plan.itinerary.spills_beyond_end_date);

    drop(container);
}
