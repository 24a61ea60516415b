use geo::{polygon, Point, Polygon};
use hexpop::{
    read_regions_from_geojson, write_scores_to_geojson, CellId, GeometryError, HexMap, Options, ScoringMethod,
    SourceRegion,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn rect(x: f64, y: f64, w: f64, h: f64) -> Polygon<f64> {
    polygon![(x: x, y: y), (x: x + w, y: y), (x: x + w, y: y + h), (x: x, y: y + h)]
}

fn options(attributes: &[&str]) -> Options {
    Options { attributes: attributes.iter().map(|s| s.to_string()).collect(), ..Default::default() }
}

/// Four tracts tiling a block of central Austin.
fn austin() -> Vec<SourceRegion> {
    let (x0, y0, step) = (-97.78, 30.24, 0.04);
    [(0, 0, 220.0, 40.0), (1, 0, 80.0, 15.0), (0, 1, 0.0, 5.0), (1, 1, 1310.0, 410.0)]
        .into_iter()
        .map(|(i, j, kids, teens)| {
            SourceRegion::new(format!("48453{i}{j}"), rect(x0 + i as f64 * step, y0 + j as f64 * step, step, step))
                .with_attribute("kids", kids)
                .with_attribute("teens", teens)
        })
        .collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() <= 1e-9 * expected.abs().max(1.0), "{actual} != {expected}");
}

#[test]
fn austin_tracts_conserve_every_attribute() {
    let map = HexMap::build(&austin(), options(&["kids", "teens"])).unwrap();

    let report = map.report();
    assert_eq!(report.distributed, 4);
    assert!(report.skipped.is_empty() && report.coverage_gaps.is_empty());
    assert!(report.partial_coverage.is_empty());

    let totals = map.layer().attribute_totals();
    assert_close(totals[0], 1610.0);
    assert_close(totals[1], 470.0);

    assert!(map.layer().cells().iter().all(|c| c.id().resolution() == 7));
    assert!(map.layer().amounts().values().iter().all(|&v| v >= 0.0));
}

#[test]
fn every_scoring_method_scores_every_cell() {
    let map = HexMap::build(&austin(), options(&["kids", "teens"])).unwrap();

    for method in ScoringMethod::ALL {
        let scores = map.score(method);
        assert_eq!(scores.len(), map.layer().len());
        assert!(scores.cells.iter().all(|c| c.score.is_finite()));
        assert_close(scores.summary().total_population, 2080.0);
    }

    let percentile = map.score(ScoringMethod::Percentile);
    assert!(percentile.cells.iter().all(|c| c.score > 0.0 && c.score <= 100.0));
    let normalized = map.score(ScoringMethod::Normalized);
    assert!(normalized.summary().mean_score.abs() < 1e-9);
}

#[test]
fn cells_in_the_dense_tract_score_highest() {
    let map = HexMap::build(&austin(), options(&["kids", "teens"])).unwrap();
    let scores = map.score(ScoringMethod::Density);

    let best = scores.cells.iter().max_by(|a, b| a.score.total_cmp(&b.score)).unwrap();
    let dense = rect(-97.74, 30.28, 0.04, 0.04);
    let centroid = best.cell.centroid().unwrap();
    assert!(geo::Intersects::intersects(&dense, &centroid), "{centroid:?}");
}

#[test]
fn unusable_regions_are_reported_and_the_rest_distributed() {
    let mut regions = austin();
    regions.push(SourceRegion::new("point", Point::new(-97.7, 30.3)).with_attribute("kids", 50.0));

    let mut map = HexMap::build(&regions, options(&["kids"])).unwrap();

    assert_eq!(map.coverage_skipped().len(), 1);
    assert_eq!(map.report().skipped[0].reason, GeometryError::Unsupported("Point"));
    assert_eq!(map.report().distributed, 4);
    assert_close(map.layer().attribute_totals()[0], 1610.0);
    assert_close(map.report().undistributed("kids").unwrap(), 50.0);

    // A region away from the existing tiling has nowhere to go.
    regions.push(SourceRegion::new("offshore", rect(-90.0, 25.0, 0.01, 0.01)).with_attribute("kids", 10.0));
    let report = map.redistribute(&regions).unwrap();
    assert_eq!(report.gap_count(), 1);
    assert_eq!(report.coverage_gaps[0].as_str(), "offshore");
    assert_close(report.undistributed("kids").unwrap(), 60.0);
    assert_close(map.layer().attribute_totals()[0], 1610.0);
}

#[test]
fn regions_beside_the_antimeridian_keep_their_mass() {
    let regions = vec![
        SourceRegion::new("west", rect(-179.99, 0.0, 0.005, 0.005)).with_attribute("pop", 100.0),
        SourceRegion::new("east", rect(179.985, 0.0, 0.005, 0.005)).with_attribute("pop", 40.0),
    ];
    let map = HexMap::build(&regions, Options { resolution: 2, ..options(&["pop"]) }).unwrap();

    assert_eq!(map.report().distributed, 2);
    assert!(map.report().coverage_gaps.is_empty());
    assert!(map.report().partial_coverage.is_empty());
    assert_close(map.layer().attribute_totals()[0], 140.0);
}

#[test]
fn redistributing_new_counts_replaces_old_ones() {
    let mut map = HexMap::build(&austin(), options(&["kids"])).unwrap();
    let cells: Vec<CellId> = map.layer().cells().iter().map(|c| c.id()).collect();

    let halved: Vec<SourceRegion> = austin().into_iter()
        .map(|r| { let kids = r.value("kids"); r.with_attribute("kids", kids / 2.0) })
        .collect();
    map.redistribute(&halved).unwrap();

    assert_eq!(map.layer().cells().iter().map(|c| c.id()).collect::<Vec<_>>(), cells);
    assert_close(map.layer().attribute_totals()[0], 805.0);
}

#[test]
fn random_regions_conserve_mass_and_ignore_thread_scheduling() {
    let mut rng = StdRng::seed_from_u64(0x4e58);
    let regions: Vec<SourceRegion> = (0..40)
        .map(|i| {
            let (x, y) = (rng.random_range(-98.0..-97.0), rng.random_range(30.0..31.0));
            let (w, h) = (rng.random_range(0.01..0.15), rng.random_range(0.01..0.15));
            SourceRegion::new(format!("r{i}"), rect(x, y, w, h))
                .with_attribute("a", rng.random_range(0.0..5000.0))
                .with_attribute("b", rng.random_range(0.0f64..50.0).floor())
        })
        .collect();
    let expected: Vec<f64> = ["a", "b"].iter()
        .map(|name| regions.iter().map(|r| r.value(name)).sum())
        .collect();

    let parallel = HexMap::build(&regions, Options { resolution: 6, ..options(&["a", "b"]) }).unwrap();
    let sequential = HexMap::build(&regions, Options { resolution: 6, parallel: false, ..options(&["a", "b"]) }).unwrap();

    assert!(parallel.report().is_conservative(1e-9));
    for (total, expected) in parallel.layer().attribute_totals().into_iter().zip(expected) {
        assert_close(total, expected);
    }
    assert_eq!(parallel.layer().amounts().values(), sequential.layer().amounts().values());
}

#[test]
fn geojson_files_in_and_out() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tracts.geojson");
    std::fs::write(&input, r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature", "properties": { "GEOID": "1", "kids": 120 },
              "geometry": { "type": "Polygon", "coordinates": [[[-97.78, 30.24], [-97.74, 30.24], [-97.74, 30.28], [-97.78, 30.28], [-97.78, 30.24]]] } },
            { "type": "Feature", "properties": { "GEOID": "2", "kids": 30.5 },
              "geometry": { "type": "MultiPolygon", "coordinates": [[[[-97.74, 30.24], [-97.70, 30.24], [-97.70, 30.28], [-97.74, 30.24]]]] } }
        ]
    }"#).unwrap();

    let regions = read_regions_from_geojson(&input, Some("GEOID")).unwrap();
    let map = HexMap::build(&regions, options(&["kids"])).unwrap();
    let scores = map.score(ScoringMethod::Percentile);

    let output = dir.path().join("cells.geojson");
    write_scores_to_geojson(&output, &scores).unwrap();

    let written: serde_json::Value = serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
    let features = written["features"].as_array().unwrap();
    assert_eq!(features.len(), map.layer().len());

    let kids: f64 = features.iter().map(|f| f["properties"]["kids"].as_f64().unwrap()).sum();
    assert_close(kids, 150.5);
    for feature in features {
        let id: CellId = feature["properties"]["cell_id"].as_str().unwrap().parse().unwrap();
        assert!(map.layer().get(id).is_some());
    }
}
