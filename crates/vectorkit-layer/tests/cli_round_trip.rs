use std::fs::File;
use std::io::{Cursor, Write};

use vectorkit_core::{
    BlockMetaData, Job, JobWriter, MarkingParams, Part, VectorBlock, VectorData, WorkPlane,
    WorkPlaneDecoder,
};
use vectorkit_layer::{CliDecoder, CliEncoding, CliWriter, LayerError};

fn sample_job() -> Job {
    let mut job = Job::new("sample");
    job.marking_params_map.insert(0, MarkingParams::default());
    job.parts_map.insert(2, Part::new("gear"));
    let meta = BlockMetaData {
        part_key: 2,
        ..BlockMetaData::default()
    };

    let mut planes = Vec::new();
    for layer in 1..=3 {
        let mut plane = WorkPlane::new(layer as f32 * 0.25);
        plane.push_block(
            VectorBlock::new(
                VectorData::LineSequence(vec![0.0, 0.0, 8.0, 0.0, 8.0, 8.0, 0.0, 8.0]),
                0,
            )
            .with_meta(meta),
        );
        plane.push_block(
            VectorBlock::new(
                VectorData::Hatches(vec![1.0, 1.0, 7.0, 1.0, 1.0, 2.0, 7.0, 2.0]),
                0,
            )
            .with_meta(meta),
        );
        planes.push(plane);
    }
    job.set_work_planes(planes);
    job
}

fn round_trip(encoding: CliEncoding, units: f64) -> Job {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.cli");

    let mut writer = CliWriter::new(File::create(&path).unwrap(), encoding).with_units(units);
    writer.write_job(&sample_job()).unwrap();
    drop(writer);

    CliDecoder::new(File::open(&path).unwrap())
        .unwrap()
        .read_job()
        .unwrap()
}

fn assert_geometry_preserved(decoded: &Job) {
    let original = sample_job();
    assert!(decoded.validate().is_ok());
    assert_eq!(decoded.num_work_planes, original.num_work_planes);
    assert_eq!(decoded.parts_map[&2].name, "gear");
    for (a, b) in decoded.work_planes.iter().zip(&original.work_planes) {
        assert!((a.z_pos_in_mm - b.z_pos_in_mm).abs() < 1e-6);
        let got: Vec<_> = a.vector_blocks.iter().map(|b| &b.data).collect();
        let want: Vec<_> = b.vector_blocks.iter().map(|b| &b.data).collect();
        assert_eq!(got, want);
    }
}

#[test]
fn ascii_round_trip() {
    assert_geometry_preserved(&round_trip(CliEncoding::Ascii, 1.0));
}

#[test]
fn binary_long_round_trip() {
    assert_geometry_preserved(&round_trip(CliEncoding::BinaryLong, 0.5));
}

#[test]
fn binary_short_round_trip() {
    assert_geometry_preserved(&round_trip(CliEncoding::BinaryShort, 0.25));
}

#[test]
fn part_height_is_computed_from_layers() {
    let job = round_trip(CliEncoding::BinaryLong, 1.0);
    assert!((job.parts_map[&2].geometry.build_height_in_mm - 0.75).abs() < 1e-6);
}

#[test]
fn unknown_opcode_is_fatal_with_code_and_offset() {
    let mut bytes = Vec::new();
    bytes.write_all(b"$$HEADERSTART\n$$BINARY\n$$UNITS/1\n$$HEADEREND").unwrap();
    let header_len = bytes.len() as u64;
    bytes.extend_from_slice(&127u16.to_le_bytes());
    bytes.extend_from_slice(&1.0f32.to_le_bytes());
    bytes.extend_from_slice(&0x4242u16.to_le_bytes());
    bytes.extend_from_slice(&[0; 16]);

    let err = CliDecoder::new(Cursor::new(bytes))
        .unwrap()
        .read_job()
        .unwrap_err();
    match err {
        LayerError::UnknownOpCode { code, offset } => {
            assert_eq!(code, 0x4242);
            assert_eq!(offset, header_len + 6);
        }
        other => panic!("expected UnknownOpCode, got {other}"),
    }
}

#[test]
fn hatch_arity_error_aborts_before_geometry() {
    let text = "$$HEADERSTART\n$$ASCII\n$$HEADEREND\n$$GEOMETRYSTART\n$$LAYER/1\n\
                $$HATCHES/1,2,0,0,1,1,2,2,3\n$$GEOMETRYEND\n";
    let mut decoder = CliDecoder::new(Cursor::new(text)).unwrap();
    assert!(matches!(
        decoder.next_workplane(),
        Err(LayerError::CoordinateCount { expected: 8, found: 7, .. })
    ));
}
