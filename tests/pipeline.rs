//! End-to-end runs of the processing pipelines on on-disk captures.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use sensor_lab_plots::config::{ImuAnglesConfig, ImuConfig, PipelineConfig};
use sensor_lab_plots::processors::{discovery, grid, imu, orientation, solar};
use sensor_lab_plots::visualization::GridLayout;
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, header: &str, rows: &[String]) {
    let mut file = File::create(dir.join(name)).unwrap();
    writeln!(file, "{}", header).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
}

fn value_rows(values: &[f64]) -> Vec<String> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{},{},{}", i, i as f64 * 0.1, v))
        .collect()
}

#[test]
fn solar_power_from_paired_captures() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_csv(dir, "plus_x_volt.csv", "sample,time,volts", &value_rows(&[1.0, 2.0, 3.0, 4.0, 5.0]));
    write_csv(dir, "plus_x_curr.csv", "sample,time,amps", &value_rows(&[5.0, 4.0, 3.0, 2.0, 1.0]));
    // current capture without a voltage partner
    write_csv(dir, "minus_y_curr.csv", "sample,time,amps", &value_rows(&[1.0]));

    let config = PipelineConfig::default();
    let series = solar::estimate_directory(dir, &config.solar).unwrap();

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].key.to_string(), "plus_x");
    assert_eq!(series[0].power, vec![5.0, 8.0, 9.0, 8.0, 5.0]);
    assert_eq!(series[0].cumulative, vec![5.0, 13.0, 22.0, 30.0, 35.0]);
}

#[test]
fn solar_row_count_mismatch_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_csv(dir, "plus_z_volt.csv", "sample,time,volts", &value_rows(&[1.0, 2.0, 3.0]));
    write_csv(dir, "plus_z_curr.csv", "sample,time,amps", &value_rows(&[1.0, 2.0]));

    let err = solar::estimate_directory(dir, &PipelineConfig::default().solar).unwrap_err();
    match err {
        solar::SolarError::RowCountMismatch { voltage_rows, current_rows, .. } => {
            assert_eq!((voltage_rows, current_rows), (3, 2));
        }
        other => panic!("expected row count mismatch, got {:?}", other),
    }
}

#[test]
fn gyro_zero_rates_give_zero_angles() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    let zeros: Vec<String> = (0..4).map(|i| format!("{},0.0", i as f64 * 0.01)).collect();
    for name in ["gyro_x.csv", "gyro_y.csv", "gyro_z.csv"] {
        write_csv(dir, name, "time,rate", &zeros);
    }

    let config = ImuAnglesConfig {
        dt: Some(0.01),
        ..ImuAnglesConfig::default()
    };
    let (angles, dt) = imu::compute_angles(dir, &config).unwrap();

    assert_eq!(dt, 0.01);
    assert_eq!(angles.len(), 4);
    for axis in angles.axes() {
        assert!(axis.iter().all(|&a| a == 0.0));
    }
}

#[test]
fn grid_of_three_files_hides_one_cell() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    for name in ["a.csv", "b.csv", "c.csv"] {
        write_csv(dir, name, "id,time,value", &value_rows(&[1.0, 2.0]));
    }

    let config = PipelineConfig::default();
    let cells = grid::load_grid_cells(dir, &config.grid).unwrap();
    let layout = GridLayout::for_count(cells.len(), config.grid.columns);

    assert_eq!(cells.len(), 3);
    assert!(cells.iter().all(|cell| cell.is_loaded()));
    assert_eq!((layout.rows, layout.cols), (2, 2));
    assert_eq!(layout.hidden(), 1);
}

#[test]
fn imu_pairs_merge_and_integrate() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::create_dir(dir.join("unrelated")).unwrap();

    let accel: Vec<String> = (0..50).map(|i| format!("{:.3},0,0,9.81", i as f64 * 0.02)).collect();
    // gyroscope timestamps offset by 1 ms, constant 45 deg/s about z
    let gyro: Vec<String> = (0..50).map(|i| format!("{:.3},0,0,45", i as f64 * 0.02 + 0.001)).collect();
    write_csv(dir, "IMU_run2_gyro.csv", "time,gx,gy,gz", &gyro);
    write_csv(dir, "imu_run2_acc.csv", "time,ax,ay,az", &accel);
    write_csv(dir, "imu_run1_gyro.csv", "time,gx", &["0,1".to_string()]);
    write_csv(dir, "imu_run1_acc.csv", "time,ax", &["0,1".to_string()]);

    let config = ImuConfig::default();
    let files = discovery::find_imu_files(dir, &config).unwrap();
    let pairs = discovery::pair_imu_files(&files, &config);
    assert_eq!(pairs.len(), 2);

    let run1 = pairs.iter().find(|p| p.key == "imu_run1").unwrap();
    assert!(matches!(
        imu::load_recording(run1, &config),
        Err(imu::ImuError::InsufficientColumns { .. })
    ));

    let run2 = pairs.iter().find(|p| p.key == "imu_run2").unwrap();
    let recording = imu::load_recording(run2, &config).unwrap();
    assert_eq!(recording.samples.len(), 50);
    assert!((recording.dt - 0.02).abs() < 1e-9);

    let states = orientation::integrate_orientation(&recording.gyro_rates(), recording.dt);
    let (_, _, yaw) = states.last().unwrap().euler_angles();
    // 50 steps of 0.02 s at 45 deg/s
    assert!((yaw.to_degrees() - 45.0).abs() < 1e-6);
}
