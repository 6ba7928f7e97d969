use proptest::prelude::*;
use vectorkit_core::{
    Job, JobWriter, MarkingParams, VectorBlock, VectorData, WorkPlane, WorkPlaneDecoder,
};
use vectorkit_laser::{LaserDecoder, LaserWriter};

// The point exposure time only travels with PE commands, so it is zero for
// every params entry used before the first point block.
fn params(power: f32, exposure: f32) -> MarkingParams {
    MarkingParams {
        laser_power_in_w: power,
        laser_speed_in_mm_per_s: 800.0,
        jump_speed_in_mm_per_s: 3000.0,
        laser_focus_shift_in_mm: -0.5,
        point_exposure_time_in_us: exposure,
        ..MarkingParams::default()
    }
}

fn sample_job() -> Job {
    let mut job = Job::new("round trip");
    job.marking_params_map.insert(0, params(100.0, 0.0));
    job.marking_params_map.insert(1, params(200.0, 25.0));

    let mut first = WorkPlane::new(0.05);
    first.push_block(VectorBlock::new(
        VectorData::LineSequence3D(vec![0.0, 0.0, 0.05, 4.0, 0.0, 0.05, 4.0, 4.0, 0.05]),
        0,
    ));
    first.push_block(VectorBlock::new(
        VectorData::Hatches3D(vec![
            1.0, 1.0, 0.05, 3.0, 1.0, 0.05, //
            1.0, 2.0, 0.05, 3.0, 2.0, 0.05,
        ]),
        0,
    ));
    first.push_block(VectorBlock::new(
        VectorData::PointSequence3D(vec![2.0, 2.0, 0.05, 2.5, 2.5, 0.05]),
        1,
    ));
    first.push_block(VectorBlock::new(
        VectorData::ExposurePause { pause_in_us: 250 },
        1,
    ));

    let mut second = WorkPlane::new(0.1);
    second.push_block(VectorBlock::new(
        VectorData::LineSequence3D(vec![0.0, 0.0, 0.1, 1.0, 0.0, 0.1, 1.0, 1.0, 0.1]),
        1,
    ));

    job.set_work_planes(vec![first, second]);
    job
}

fn write(job: &Job) -> String {
    let mut writer = LaserWriter::new(Vec::new());
    writer.write_job(job).unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
}

#[test]
fn round_trip_preserves_blocks_and_params() {
    let original = sample_job();
    let text = write(&original);
    let decoded = LaserDecoder::new(text.as_bytes()).read_job().unwrap();

    assert!(decoded.validate().is_ok());
    assert_eq!(decoded.num_work_planes, 2);
    assert_eq!(decoded.marking_params_map.len(), 2);

    for (a, b) in decoded.work_planes.iter().zip(&original.work_planes) {
        assert_eq!(a.z_pos_in_mm, b.z_pos_in_mm);
        assert_eq!(a.num_blocks, b.num_blocks);
        for (x, y) in a.vector_blocks.iter().zip(&b.vector_blocks) {
            assert_eq!(x.data, y.data);
            assert_eq!(
                decoded.marking_params_map[&x.marking_params_key],
                original.marking_params_map[&y.marking_params_key]
            );
        }
    }
}

#[test]
fn two_point_polyline_comes_back_as_hatch() {
    let mut job = Job::new("short");
    job.marking_params_map.insert(0, MarkingParams::default());
    let mut plane = WorkPlane::new(0.0);
    plane.push_block(VectorBlock::new(
        VectorData::LineSequence3D(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]),
        0,
    ));
    job.set_work_planes(vec![plane]);

    let decoded = LaserDecoder::new(write(&job).as_bytes()).read_job().unwrap();
    assert_eq!(
        decoded.work_planes[0].vector_blocks[0].data,
        VectorData::Hatches3D(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0])
    );
}

#[test]
fn scenario_polyline() {
    let job = LaserDecoder::new("LP100\nVG50\nJP0,0,0\nGO10,0,0\nGO20,0,0\n".as_bytes())
        .read_job()
        .unwrap();
    let blocks: Vec<_> = job.blocks().collect();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].data.element_count(), 3);
    assert!(matches!(blocks[0].data, VectorData::LineSequence3D(_)));
}

#[test]
fn scenario_two_hatch_segments() {
    let job = LaserDecoder::new("JP0,0,0\nGO10,0,0\nJP5,5,0\nGO15,5,0\n".as_bytes())
        .read_job()
        .unwrap();
    let blocks: Vec<_> = job.blocks().collect();
    assert_eq!(blocks.len(), 1);
    assert!(matches!(blocks[0].data, VectorData::Hatches3D(_)));
    assert_eq!(blocks[0].data.element_count(), 2);
}

fn segment() -> impl Strategy<Value = [i8; 4]> {
    prop::array::uniform4(-20i8..20)
}

proptest! {
    #[test]
    fn decoded_blocks_always_satisfy_arity(segments in prop::collection::vec(segment(), 1..30)) {
        let mut text = String::new();
        for (i, s) in segments.iter().enumerate() {
            if i % 7 == 3 {
                text.push_str(&format!("LP{}\n", i));
            }
            text.push_str(&format!("JP{},{},0\nGO{},{},0\n", s[0], s[1], s[2], s[3]));
            if i % 5 == 4 {
                text.push_str(&format!("GO{},{},0\n", s[0], s[3]));
            }
        }
        let job = LaserDecoder::new(text.as_bytes()).read_job().unwrap();
        prop_assert!(job.validate().is_ok());
        for block in job.blocks() {
            prop_assert!(!block.data.is_empty());
            prop_assert!(block.data.check_arity().is_ok());
        }
    }
}
