//! Integration tests for pk-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{DemandSnapshotRow, RefreshRow, TickSummaryRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    fn records(path: std::path::PathBuf) -> Vec<csv::StringRecord> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("demand_snapshots.csv").exists());
        assert!(dir.path().join("refreshes.csv").exists());
        assert!(dir.path().join("tick_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_without_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(dir.path().join("demand_snapshots.csv")),
            ["facility_id", "frame", "demand", "cooldown_start_frame"]
        );
        assert_eq!(
            headers(dir.path().join("refreshes.csv")),
            ["frame", "facility_id", "kind", "effective", "capacity", "full_with_demand", "drop_record"]
        );
        assert_eq!(headers(dir.path().join("tick_summaries.csv")).len(), 9);
        assert!(records(dir.path().join("demand_snapshots.csv")).is_empty());
    }

    #[test]
    fn csv_snapshot_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[
            DemandSnapshotRow { facility_id: 3, frame: 40, demand: 11, cooldown_start_frame: 32 },
            DemandSnapshotRow { facility_id: 5, frame: 40, demand: 0, cooldown_start_frame: 40 },
        ])
        .unwrap();
        w.finish().unwrap();

        let rows = records(dir.path().join("demand_snapshots.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][2], "11");
        assert_eq!(&rows[0][3], "32");
        assert_eq!(&rows[1][0], "5");
    }

    #[test]
    fn csv_refresh_row_roadside_has_empty_capacity() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_refresh(&RefreshRow {
            frame:            7,
            facility_id:      2,
            kind:             "roadside",
            effective:        24.5,
            capacity:         None,
            full_with_demand: false,
            drop_record:      false,
        })
        .unwrap();
        w.finish().unwrap();

        let rows = records(dir.path().join("refreshes.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][2], "roadside");
        assert_eq!(&rows[0][3], "24.5");
        assert_eq!(&rows[0][4], "");
        assert_eq!(&rows[0][5], "false");
    }

    #[test]
    fn csv_tick_summary_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow {
            frame:            3,
            events:           10,
            skipped_events:   1,
            evaluated:        2,
            upserts:          2,
            removals:         0,
            refreshed:        1,
            corrective_drops: 0,
            suppressed:       4,
        })
        .unwrap();
        w.finish().unwrap();

        let rows = records(dir.path().join("tick_summaries.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "10");
        assert_eq!(&rows[0][8], "4");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn missing_directory_errors() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("does/not/exist")).is_err());
    }
}

#[cfg(test)]
mod observer_tests {
    use tempfile::TempDir;

    use pk_capacity::{Facility, RawCapacity};
    use pk_core::{FacilityId, ParkingConfig};
    use pk_sim::{CapacityTable, FacilityEvent, ParkingSimBuilder};

    use crate::{CsvWriter, DemandOutputObserver};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn integration_csv() {
        let garage = FacilityId(0);
        let lane = FacilityId(1);
        let mut table = CapacityTable::new();
        table.set(garage, RawCapacity::Garage { occupancy: 9, vanilla_capacity: 10 });
        table.set(lane, RawCapacity::Roadside { free_space: 30.0 });

        let mut sim = ParkingSimBuilder::new(ParkingConfig::default(), table)
            .facilities([Facility::garage(garage), Facility::roadside(lane)])
            .snapshot_interval(2)
            .build()
            .unwrap();

        let dir = tmp();
        let mut obs = DemandOutputObserver::new(CsvWriter::new(dir.path()).unwrap());

        let mut events = vec![FacilityEvent::queued(garage); 10];
        events.extend(vec![FacilityEvent::queued(lane); 9]);
        sim.step(&events, &mut [], &mut obs);
        for _ in 0..5 {
            sim.step(&[], &mut [], &mut obs);
        }
        obs.finish();
        assert!(obs.take_error().is_none(), "no write errors expected");

        // 6 ticks, one summary each.
        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        assert_eq!(rdr.records().count(), 6);

        // Snapshots at ticks 0, 2, 4 with both records live.
        let mut rdr = csv::Reader::from_path(dir.path().join("demand_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 6);
        assert_eq!(&rows[0][0], "0");
        assert_eq!(&rows[1][0], "1");

        // Both facilities crossed into a penalty bucket on the first tick.
        let mut rdr = csv::Reader::from_path(dir.path().join("refreshes.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "garage");
        assert_eq!(&rows[0][3], "10.0");
        assert_eq!(&rows[0][4], "10");
        assert_eq!(&rows[0][5], "true");
        assert_eq!(&rows[1][2], "roadside");
        assert_eq!(&rows[1][3], "24.0");
    }
}
