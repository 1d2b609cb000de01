//! Integration tests for the owtgeo CLI and library
//!
//! These tests exercise the commands end-to-end using assert_cmd against a
//! small two-turbine dataset written to a temp directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use owtgeo::core::loader::{parse_dataset, DatasetFormat};
use owtgeo::processing::can_adjust_properties;
use owtgeo::processing::tables::TubularRow;

/// Tower base 20 mLAT, bolted pile head at 5 mLAT, pile toe at -60 mLAT
const DATASET: &str = "\
materials:
  - id: 1
    title: S355
    young_modulus: 210000.0
    density: 7850.0
    poisson_ratio: 0.3
building_blocks:
  - { title: tw_can_1, sub_assembly: 10, z_position: 0.0, height: 10000.0, bottom_outer_diameter: 6000.0, top_outer_diameter: 5000.0, wall_thickness: 40.0, material: 1 }
  - { title: tw_can_2, sub_assembly: 10, z_position: 10000.0, height: 10000.0, bottom_outer_diameter: 5000.0, top_outer_diameter: 4000.0, wall_thickness: 30.0, material: 1 }
  - { title: RNA, sub_assembly: 10, z_position: 20000.0, mass: 300000.0 }
  - { title: TW_platform, sub_assembly: 10, z_position: 5000.0, mass: 2000.0 }
  - { title: tp_can_1, sub_assembly: 20, z_position: 0.0, height: 10000.0, bottom_outer_diameter: 6500.0, top_outer_diameter: 6500.0, wall_thickness: 50.0, material: 1 }
  - { title: tp_can_2, sub_assembly: 20, z_position: 10000.0, height: 5000.0, bottom_outer_diameter: 6500.0, top_outer_diameter: 6500.0, wall_thickness: 50.0, material: 1 }
  - { title: TP_boat_landing, sub_assembly: 20, z_position: 3000.0, mass: 10000.0 }
  - { title: mp_can_1, sub_assembly: 30, z_position: 0.0, height: 40000.0, bottom_outer_diameter: 6000.0, top_outer_diameter: 6000.0, wall_thickness: 60.0, material: 1 }
  - { title: mp_can_2, sub_assembly: 30, z_position: 40000.0, height: 25000.0, bottom_outer_diameter: 6000.0, top_outer_diameter: 6500.0, wall_thickness: 60.0, material: 1 }
  - { title: tw_can_1, sub_assembly: 11, z_position: 0.0, height: 10000.0, bottom_outer_diameter: 6000.0, top_outer_diameter: 5000.0, wall_thickness: 40.0, material: 1 }
  - { title: RNA, sub_assembly: 11, z_position: 10000.0, mass: 300000.0 }
  - { title: tp_can_1, sub_assembly: 21, z_position: 0.0, height: 15000.0, bottom_outer_diameter: 6500.0, top_outer_diameter: 6500.0, wall_thickness: 50.0, material: 1 }
  - { title: mp_can_1, sub_assembly: 31, z_position: 0.0, height: 65000.0, bottom_outer_diameter: 6000.0, top_outer_diameter: 6000.0, wall_thickness: 60.0, material: 1 }
turbines:
  - title: T01
    location: { elevation: -30.0 }
    subassemblies:
      - { id: 10, title: TW_T01, subassembly_type: TW, z_position: 20000.0 }
      - { id: 20, title: TP_T01, subassembly_type: TP, z_position: 5000.0 }
      - { id: 30, title: MP_T01, subassembly_type: MP, z_position: -60000.0 }
  - title: T02
    location: { elevation: -25.0 }
    subassemblies:
      - { id: 11, title: TW_T02, subassembly_type: TW, z_position: 20000.0 }
      - { id: 21, title: TP_T02, subassembly_type: TP, z_position: 5000.0 }
      - { id: 31, title: MP_T02, subassembly_type: MP, z_position: -60000.0 }
";

/// Helper to get an owtgeo command isolated from user config
fn owtgeo(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("owtgeo").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path())
        .env_remove("OWTGEO_FORMAT")
        .env_remove("OWTGEO_SECTION_PROPERTIES")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to write the dataset into a temp directory
fn setup_dataset() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fleet.yaml");
    fs::write(&path, DATASET).unwrap();
    (tmp, path)
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let tmp = TempDir::new().unwrap();
    owtgeo(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("pile"));
}

#[test]
fn test_version() {
    let tmp = TempDir::new().unwrap();
    owtgeo(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("owtgeo"));
}

// ============================================================================
// Process Command Tests
// ============================================================================

#[test]
fn test_process_summary_table() {
    let (tmp, path) = setup_dataset();
    owtgeo(&tmp)
        .arg("process")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Turbine name"))
        .stdout(predicate::str::contains("T01"))
        .stdout(predicate::str::contains("T02"))
        .stderr(predicate::str::contains("2 row(s)"));
}

#[test]
fn test_process_summary_json() {
    let (tmp, path) = setup_dataset();
    let value = json_stdout(owtgeo(&tmp).args(["process", "-f", "json"]).arg(&path));
    let turbines = value.as_array().unwrap();
    assert_eq!(turbines.len(), 2);
    assert_eq!(turbines[0]["Turbine name"], "T01");
    assert_eq!(turbines[0]["Water depth [m]"], -30.0);
    assert_eq!(turbines[0]["Tower base [m]"], 20.0);
    assert_eq!(turbines[0]["Monopile head [m]"], 5.0);
    assert_eq!(turbines[0]["Monopile toe [m]"], -60.0);
    assert_eq!(turbines[0]["RNA mass [t]"], 300.0);
    assert_eq!(turbines[1]["Turbine name"], "T02");
    assert_eq!(turbines[1]["Water depth [m]"], -25.0);
}

#[test]
fn test_process_full_structure_is_labelled() {
    let (tmp, path) = setup_dataset();
    let value = json_stdout(
        owtgeo(&tmp)
            .args(["process", "-t", "full-structure", "-f", "json"])
            .arg(&path),
    );
    let rows = value.as_array().unwrap();
    // T01: 2 tower + 2 TP + 2 MP cans, T02: one of each
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[0]["Turbine"], "T01");
    assert_eq!(rows[0]["Subassembly"], "TW");
    assert_eq!(rows[8]["Turbine"], "T02");
    assert_eq!(rows[8]["Subassembly"], "MP");
}

#[test]
fn test_process_single_turbine_csv() {
    let (tmp, path) = setup_dataset();
    owtgeo(&tmp)
        .args(["process", "-t", "tubular", "-f", "csv", "--turbine", "T01"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Title,Elevation from [mLAT]"))
        .stdout(predicate::str::contains("tw_can_1"))
        .stdout(predicate::str::contains("mp_can_2"))
        .stdout(predicate::str::contains("T02").not());
}

#[test]
fn test_process_unknown_turbine() {
    let (tmp, path) = setup_dataset();
    owtgeo(&tmp)
        .args(["process", "--turbine", "T99"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("T99"));
}

#[test]
fn test_process_output_file() {
    let (tmp, path) = setup_dataset();
    let out = tmp.path().join("lumped.tsv");
    owtgeo(&tmp)
        .args(["process", "-t", "lumped", "-f", "tsv", "-o"])
        .arg(&out)
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Table written to"));

    let content = fs::read_to_string(out).unwrap();
    assert!(content.starts_with("Turbine\tTitle"));
    assert!(content.contains("TP_boat_landing"));
}

#[test]
fn test_process_format_from_project_config() {
    let (tmp, path) = setup_dataset();
    fs::write(tmp.path().join(".owtgeo.yaml"), "default_format: csv\n").unwrap();
    owtgeo(&tmp)
        .arg("process")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Turbine name,"));
}

#[test]
fn test_process_bad_dataset() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.yaml");
    fs::write(&path, "turbines:\n  - title: T01\n    location:\n      elevation: deep\n").unwrap();
    owtgeo(&tmp)
        .arg("process")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid dataset"));
}

#[test]
fn test_process_missing_dataset() {
    let tmp = TempDir::new().unwrap();
    owtgeo(&tmp)
        .args(["process", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read dataset"));
}

// ============================================================================
// Inspect and Pile Command Tests
// ============================================================================

#[test]
fn test_inspect_turbine() {
    let (tmp, path) = setup_dataset();
    let value = json_stdout(
        owtgeo(&tmp)
            .args(["inspect", "--turbine", "T01", "-f", "json"])
            .arg(&path),
    );
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Kind"], "Tower");
    assert_eq!(rows[0]["Height [m]"], 20.0);
    assert_eq!(rows[0]["Bottom [mLAT]"], 20.0);
    assert_eq!(rows[2]["Kind"], "Monopile");
    assert_eq!(rows[2]["Bottom [mLAT]"], -60.0);
}

#[test]
fn test_pile_with_cutoff() {
    let (tmp, path) = setup_dataset();
    let value = json_stdout(
        owtgeo(&tmp)
            .args(["pile", "--turbine", "T01", "--cutoff", "0", "-f", "json"])
            .arg(&path),
    );
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["Elevation from [m]"], 0.0);
    assert_eq!(rows[0]["Elevation to [m]"], 30.0);
    assert_eq!(rows[0]["Pile material"], "S355");
    assert_eq!(rows[0]["Diameter [m]"], 6.0);
}

#[test]
fn test_pile_negative_cutoff() {
    let (tmp, path) = setup_dataset();
    let value = json_stdout(
        owtgeo(&tmp)
            .args(["pile", "--turbine", "T01", "--cutoff", "-5", "-f", "json"])
            .arg(&path),
    );
    assert_eq!(value[0]["Elevation from [m]"], -5.0);
}

// ============================================================================
// Library Tests
// ============================================================================

#[test]
fn test_library_fleet_from_dataset() {
    let dataset = parse_dataset(DATASET, "fleet.yaml", DatasetFormat::Yaml).unwrap();
    let mut fleet = dataset.build_fleet(Default::default()).unwrap();
    assert_eq!(fleet.turbines().collect::<Vec<_>>(), ["T01", "T02"]);
    assert!(!fleet.all_turbines().is_processed());

    fleet.process_structures().unwrap();
    let summary = fleet.all_turbines().into_inner();
    assert_eq!(summary[1].tower_height, Some(10.0));

    let t02 = fleet.select_owt("T02").unwrap();
    let sub = t02.substructure().into_inner().unwrap();
    assert_eq!(sub.len(), 2);
    assert_eq!(sub[0].elevation_to, 5.0);
}

fn can(from: f64, to: f64) -> TubularRow {
    TubularRow {
        title: "can".to_string(),
        elevation_from: from,
        elevation_to: to,
        height: (from - to).abs(),
        diameter_from: 6.0,
        diameter_to: 6.0,
        volume: 5.0,
        wall_thickness: 10.0,
        youngs_modulus: 210.0,
        poissons_ratio: 0.3,
        mass: 10.0,
        rho: 1.0,
        subassembly: None,
    }
}

#[test]
fn test_library_can_adjust_properties() {
    let mut row = can(10.0, 0.0);
    row.height = 3.0;
    let props = can_adjust_properties(&row).unwrap();
    assert_eq!(props.height, 10.0);
    assert!((props.mass / props.volume - 2.0).abs() < 1e-9);
    assert!((props.rho - props.mass / props.height).abs() < 1e-9);
}

const GROUTED_JOINT: &str = "\
materials:
  - { id: 1, title: S355, young_modulus: 210000.0, density: 7850.0, poisson_ratio: 0.3 }
building_blocks:
  - { title: tp_can_1, sub_assembly: 20, z_position: 0.0, height: 4000.0, bottom_outer_diameter: 6500.0, top_outer_diameter: 6500.0, wall_thickness: 50.0, material: 1 }
  - { title: tp_can_2, sub_assembly: 20, z_position: 4000.0, height: 2000.0, bottom_outer_diameter: 6000.0, top_outer_diameter: 5000.0, wall_thickness: 50.0, material: 1 }
  - { title: tp_can_3, sub_assembly: 20, z_position: 6000.0, height: 2000.0, bottom_outer_diameter: 5000.0, top_outer_diameter: 5000.0, wall_thickness: 50.0, material: 1 }
  - { title: mp_can_1, sub_assembly: 30, z_position: 0.0, height: 10000.0, bottom_outer_diameter: 6000.0, top_outer_diameter: 6000.0, wall_thickness: 60.0, material: 1 }
turbines:
  - title: J01
    location: { elevation: -3.0 }
    tower_base: 8.0
    pile_head: 5.0
    subassemblies:
      - { id: 20, title: TP_J01, subassembly_type: TP, z_position: 0.0 }
      - { id: 30, title: MP_J01, subassembly_type: MP, z_position: -5000.0 }
";

#[test]
fn test_library_grouted_joint_cuts_both_stacks() {
    let dataset = parse_dataset(GROUTED_JOINT, "joint.yaml", DatasetFormat::Yaml).unwrap();
    let mut fleet = dataset.build_fleet(Default::default()).unwrap();
    fleet.process_structures().unwrap();
    let owt = fleet.select_owt("J01").unwrap();

    let sub = owt.substructure().processed().flatten().unwrap();
    let titles: Vec<_> = sub.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["tp_can_3", "tp_can_2", "mp_can_1"]);
    assert_eq!((sub[1].elevation_from, sub[1].elevation_to), (6.0, 5.0));
    assert!((sub[1].diameter_to - 5.5).abs() < 1e-12);

    let skirt = owt.tp_skirt().processed().flatten().unwrap();
    assert_eq!(skirt.len(), 2);
    assert_eq!((skirt[0].elevation_from, skirt[0].elevation_to), (5.0, 4.0));
    assert!((skirt[0].diameter_from - 5.5).abs() < 1e-12);
    assert_eq!((skirt[1].elevation_from, skirt[1].elevation_to), (4.0, 0.0));
    assert!((skirt[0].mass / skirt[0].volume - sub[1].mass / sub[1].volume).abs() < 1e-9);

    // fleet tables carry the same cut cans
    let fleet_skirt = fleet.tp_skirt().into_inner().unwrap();
    assert_eq!(fleet_skirt[0].turbine, "J01");
    assert_eq!(fleet_skirt[0].row, skirt[0]);
}
