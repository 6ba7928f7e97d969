use proptest::prelude::*;
use vectorkit_core::{Job, MarkingParams, VectorBlock, VectorData, WorkPlane};

fn plane(z_steps: u8, blocks: usize) -> WorkPlane {
    let mut plane = WorkPlane::new(f32::from(z_steps) * 0.05);
    for i in 0..blocks {
        plane.push_block(VectorBlock::new(
            VectorData::Hatches(vec![0.0, i as f32, 1.0, i as f32]),
            0,
        ));
    }
    plane
}

proptest! {
    #[test]
    fn assembled_planes_are_strictly_ordered(
        layers in prop::collection::vec((0u8..20, 1usize..4), 0..40)
    ) {
        let total_blocks: usize = layers.iter().map(|(_, n)| n).sum();
        let mut job = Job::new("prop");
        job.marking_params_map.insert(0, MarkingParams::default());
        job.set_work_planes(layers.iter().map(|&(z, n)| plane(z, n)).collect());

        prop_assert!(job.validate().is_ok());
        prop_assert_eq!(job.num_work_planes as usize, job.work_planes.len());
        prop_assert_eq!(job.blocks().count(), total_blocks);
        for (index, plane) in job.work_planes.iter().enumerate() {
            prop_assert_eq!(plane.work_plane_number as usize, index);
            prop_assert!(plane.vector_blocks.iter().all(|b| b.data.check_arity().is_ok()));
        }
    }

    #[test]
    fn append_keeps_every_block(
        left in prop::collection::vec((0u8..10, 1usize..3), 1..10),
        right in prop::collection::vec((0u8..10, 1usize..3), 1..10),
    ) {
        let build = |layers: &[(u8, usize)]| {
            let mut job = Job::new("side");
            job.marking_params_map.insert(0, MarkingParams::default());
            job.set_work_planes(layers.iter().map(|&(z, n)| plane(z, n)).collect());
            job
        };
        let mut a = build(&left);
        let b = build(&right);
        let expected = a.blocks().count() + b.blocks().count();

        a.append(b).unwrap();
        prop_assert_eq!(a.blocks().count(), expected);
        prop_assert_eq!(a.marking_params_map.len(), 1);
        prop_assert!(a.validate().is_ok());
    }
}
