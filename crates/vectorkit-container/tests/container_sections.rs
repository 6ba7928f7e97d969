//! Container directories end to end

use std::fs;
use std::path::Path;

use vectorkit_core::{JobWriter, PartArea, StructureType, VectorData, WorkPlaneDecoder};
use vectorkit_container::{ContainerError, ContainerReader, ContainerWriter};

fn section(dir: &Path, stem: &str, geometry: &str, params: &str) {
    let doc = format!(
        "$$HEADERSTART\n$$ASCII\n$$UNITS/1\n$$HEADEREND\n$$GEOMETRYSTART\n{geometry}$$GEOMETRYEND\n"
    );
    fs::write(dir.join(format!("{stem}.cli")), doc).unwrap();
    fs::write(dir.join(format!("{stem}.txt")), params).unwrap();
}

const HATCH_PARAMS: &str = "LaserPower = 200 W\nMarkSpeed = 1000 mm/s\n";
const CONTOUR_PARAMS: &str = "# contour\nLaserPower = 100 W\nMarkSpeed = 400 mm/s\n";

fn build_container(dir: &Path) {
    section(
        dir,
        "gear_C_V",
        "$$LAYER/0.1\n$$HATCHES/1,2,0,0,1,0,0,2,1,2\n\
         $$LAYER/0.2\n$$HATCHES/1,1,0,0,1,0\n\
         $$LAYER/0.3\n$$HATCHES/1,1,0,1,1,1\n",
        HATCH_PARAMS,
    );
    section(
        dir,
        "gear_C_C",
        "$$LAYER/0.1\n$$POLYLINE/1,0,3,0,0,5,0,5,5\n$$LAYER/0.2\n$$POLYLINE/1,0,2,0,0,5,0\n",
        CONTOUR_PARAMS,
    );
    section(
        dir,
        "axle_S_SV",
        "$$LAYER/0.1\n$$HATCHES/7,1,3,3,4,3\n",
        HATCH_PARAMS,
    );
}

#[test]
fn sections_merge_into_one_job() {
    let dir = tempfile::tempdir().unwrap();
    build_container(dir.path());

    let job = ContainerReader::open(dir.path()).unwrap().read_job().unwrap();
    assert!(job.validate().is_ok());
    assert_eq!(job.num_work_planes, 3);

    assert_eq!(job.parts_map.len(), 2);
    assert_eq!(job.parts_map[&0].name, "axle");
    assert_eq!(job.parts_map[&1].name, "gear");
    assert!((job.parts_map[&0].geometry.build_height_in_mm - 0.1).abs() < 1e-6);
    assert!((job.parts_map[&1].geometry.build_height_in_mm - 0.3).abs() < 1e-6);

    // axle and gear hatches share the same parameter file content
    assert_eq!(job.marking_params_map.len(), 2);
    assert_eq!(job.marking_params_map[&0].laser_power_in_w, 200.0);
    assert_eq!(job.marking_params_map[&1].laser_speed_in_mm_per_s, 400.0);

    let first = &job.work_planes[0].vector_blocks;
    assert_eq!(first.len(), 3);

    let axle = first[0].meta.unwrap();
    assert_eq!(axle.part_key, 0);
    assert_eq!(axle.structure_type, StructureType::Support);
    assert_eq!(first[0].marking_params_key, 0);

    let contour = first[1].meta.unwrap();
    assert_eq!(contour.part_area, PartArea::Contour);
    assert_eq!(first[1].marking_params_key, 1);
    assert_eq!(
        first[1].data,
        VectorData::LineSequence(vec![0.0, 0.0, 5.0, 0.0, 5.0, 5.0])
    );

    assert_eq!(
        first[2].data,
        VectorData::Hatches(vec![0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 1.0, 2.0])
    );
    assert_eq!(first[2].marking_params_key, 0);
    assert_eq!(first[2].meta.unwrap().part_area, PartArea::Volume);
}

#[test]
fn written_container_reads_back() {
    let source = tempfile::tempdir().unwrap();
    build_container(source.path());
    let job = ContainerReader::open(source.path()).unwrap().read_job().unwrap();

    let target = tempfile::tempdir().unwrap();
    let out = target.path().join("copy");
    ContainerWriter::new(&out).write_job(&job).unwrap();
    assert!(out.join("axle_S_V.cli").is_file());
    assert!(out.join("gear_C_C.txt").is_file());

    let decoded = ContainerReader::open(&out).unwrap().read_job().unwrap();
    assert_eq!(decoded.work_planes, job.work_planes);
    assert_eq!(decoded.marking_params_map, job.marking_params_map);
    assert_eq!(decoded.parts_map, job.parts_map);
}

#[test]
fn unclassified_filename_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    build_container(dir.path());
    section(dir.path(), "layer0001", "$$LAYER/0.1\n", HATCH_PARAMS);

    let err = ContainerReader::open(dir.path()).err().unwrap();
    match err {
        ContainerError::Unclassified { filename } => assert_eq!(filename, "layer0001.cli"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn unit_mismatch_aborts_decoding() {
    let dir = tempfile::tempdir().unwrap();
    section(
        dir.path(),
        "gear_C_V",
        "$$LAYER/0.1\n$$HATCHES/1,1,0,0,1,0\n",
        "LaserPower = 0.2 kW\n",
    );

    let err = ContainerReader::open(dir.path())
        .unwrap()
        .read_job()
        .unwrap_err();
    assert!(matches!(
        err,
        ContainerError::UnitMismatch { ref key, .. } if key == "LaserPower"
    ));
}
