//! Decoder and writer seams shared by every format crate
//!
//! A format crate implements [`WorkPlaneDecoder`] to hand out closed work
//! planes one at a time and [`JobWriter`] to receive them in Z order.

use crate::model::{Job, WorkPlane};

/// Streaming source of work planes
pub trait WorkPlaneDecoder {
    /// Error type of the format
    type Error;

    /// Decode until the next work plane is closed
    ///
    /// Returns `Ok(None)` at end of stream. Planes come out in stream order,
    /// which is not necessarily sorted by Z.
    fn next_workplane(&mut self) -> Result<Option<WorkPlane>, Self::Error>;

    /// Take the job without planes: metadata, parts and params seen so far
    ///
    /// Only complete after [`WorkPlaneDecoder::next_workplane`] has returned
    /// `None`.
    fn take_shell(&mut self) -> Job;

    /// Drain the decoder into a fully assembled job
    fn read_job(mut self) -> Result<Job, Self::Error>
    where
        Self: Sized,
    {
        let mut planes = Vec::new();
        while let Some(plane) = self.next_workplane()? {
            planes.push(plane);
        }
        let mut job = self.take_shell();
        job.set_work_planes(planes);
        job.update_part_heights();
        tracing::debug!(
            planes = job.num_work_planes,
            params = job.marking_params_map.len(),
            "decoded job"
        );
        Ok(job)
    }
}

/// Streaming sink of work planes
pub trait JobWriter {
    /// Error type of the format
    type Error;

    /// Start the output with everything but the planes
    fn begin(&mut self, shell: &Job) -> Result<(), Self::Error>;

    /// Write one plane; planes arrive in increasing Z
    fn append_work_plane(&mut self, plane: &WorkPlane) -> Result<(), Self::Error>;

    /// Finish the output
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Write a whole job
    fn write_job(&mut self, job: &Job) -> Result<(), Self::Error> {
        self.begin(&job.shell())?;
        for plane in &job.work_planes {
            self.append_work_plane(plane)?;
        }
        self.close()
    }
}
