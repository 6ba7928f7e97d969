//! Writer output decoded again

use proptest::prelude::*;
use std::f64::consts::FRAC_PI_2;

use vectorkit_core::{
    ArcSequence, Job, JobWriter, MarkingParams, VectorBlock, VectorData, WorkPlane,
    WorkPlaneDecoder,
};
use vectorkit_gcode::{GcodeDecoder, GcodeWriter};

fn params(speed: f32, power: f32) -> MarkingParams {
    MarkingParams {
        laser_speed_in_mm_per_s: speed,
        laser_power_in_w: power,
        ..MarkingParams::default()
    }
}

fn round_trip(job: &Job) -> Job {
    let mut writer = GcodeWriter::new(Vec::new());
    writer.write_job(job).unwrap();
    let text = writer.into_inner();
    GcodeDecoder::new(text.as_slice()).read_job().unwrap()
}

fn sample_job() -> Job {
    let mut job = Job::new("bracket");
    job.marking_params_map.insert(0, params(10.0, 50.0));
    job.marking_params_map.insert(1, params(20.0, 80.0));

    let mut first = WorkPlane::new(0.0);
    first.push_block(VectorBlock::new(
        VectorData::LineSequence(vec![0.0, 0.0, 5.0, 0.0, 5.0, 5.0]),
        0,
    ));
    first.push_block(VectorBlock::new(
        VectorData::Arcs(ArcSequence {
            angle: FRAC_PI_2,
            arcs: vec![6.0, 0.0, 5.0, 0.0, 5.0, 1.0, 5.0, 0.0],
        }),
        1,
    ));

    let mut second = WorkPlane::new(0.5);
    second.push_block(VectorBlock::new(
        VectorData::Hatches(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
        0,
    ));
    second.push_block(VectorBlock::new(
        VectorData::ExposurePause { pause_in_us: 2000 },
        0,
    ));

    job.set_work_planes(vec![first, second]);
    job
}

#[test]
fn test_planes_and_params_survive() {
    let decoded = round_trip(&sample_job());
    assert_eq!(decoded.num_work_planes, 2);
    assert_eq!(decoded.work_planes[1].z_pos_in_mm, 0.5);
    assert_eq!(decoded.marking_params_map.len(), 2);
    assert_eq!(decoded.marking_params_map[&0], params(10.0, 50.0));
    assert_eq!(decoded.marking_params_map[&1], params(20.0, 80.0));
    assert!(decoded.validate().is_ok());
}

#[test]
fn test_polyline_and_arcs() {
    let decoded = round_trip(&sample_job());
    let blocks = &decoded.work_planes[0].vector_blocks;
    assert_eq!(blocks.len(), 2);
    assert_eq!(
        blocks[0].data,
        VectorData::LineSequence3D(vec![0.0, 0.0, 0.0, 5.0, 0.0, 0.0, 5.0, 5.0, 0.0])
    );

    let VectorData::Arcs(seq) = &blocks[1].data else {
        panic!("expected arcs, got {:?}", blocks[1].data);
    };
    assert_eq!(blocks[1].marking_params_key, 1);
    assert!((seq.angle - FRAC_PI_2).abs() < 1e-5);
    assert_eq!(seq.arcs.len(), 8);
    for (got, want) in seq.arcs.iter().zip([6.0, 0.0, 5.0, 0.0, 5.0, 1.0, 5.0, 0.0]) {
        assert!((got - want).abs() < 1e-5);
    }
}

#[test]
fn test_hatches_come_back_as_lines() {
    let decoded = round_trip(&sample_job());
    let blocks = &decoded.work_planes[1].vector_blocks;
    assert_eq!(blocks.len(), 3);
    assert_eq!(
        blocks[0].data,
        VectorData::LineSequence3D(vec![0.0, 0.0, 0.5, 1.0, 0.0, 0.5])
    );
    assert_eq!(
        blocks[1].data,
        VectorData::LineSequence3D(vec![0.0, 1.0, 0.5, 1.0, 1.0, 0.5])
    );
    assert_eq!(blocks[2].data, VectorData::ExposurePause { pause_in_us: 2000 });
}

#[test]
fn test_comments_and_line_numbers() {
    let text = "%\nN10 G21 (metric)\nN20 G0 X1 Y1 ; travel\nN30 G1 X2 Y1 F120 S10\n%\n";
    let job = GcodeDecoder::new(text.as_bytes()).read_job().unwrap();
    let block = job.blocks().next().unwrap();
    assert_eq!(
        block.data,
        VectorData::LineSequence3D(vec![1.0, 1.0, 0.0, 2.0, 1.0, 0.0])
    );
    assert_eq!(job.marking_params_map[&0].laser_speed_in_mm_per_s, 2.0);
}

proptest! {
    #[test]
    fn polyline_points_survive(steps in prop::collection::vec((1i32..20, -20i32..20), 1..12)) {
        let mut coords = vec![0.0f32, 0.0];
        let (mut x, mut y) = (0i32, 0i32);
        for (dx, dy) in &steps {
            x += dx;
            y += dy;
            coords.extend([x as f32, y as f32]);
        }

        let mut job = Job::new("walk");
        job.marking_params_map.insert(0, params(100.0, 10.0));
        let mut plane = WorkPlane::new(0.0);
        plane.push_block(VectorBlock::new(VectorData::LineSequence(coords.clone()), 0));
        job.set_work_planes(vec![plane]);

        let decoded = round_trip(&job);
        let blocks: Vec<_> = decoded.blocks().collect();
        prop_assert_eq!(blocks.len(), 1);
        let xy: Vec<f32> = blocks[0].data.xy_points().flat_map(|(x, y)| [x, y]).collect();
        prop_assert_eq!(xy, coords);
    }
}
