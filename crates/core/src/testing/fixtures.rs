//! Shared test fixtures.

use crate::gallery::{Gallery, GalleryImage};
use crate::job::{JobSource, JobStatus, ProcessingJob};

/// Staged RAW keys `staging/IMG_0000.CR2` ... for an `n`-file batch.
pub fn staged_raw_keys(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("staging/IMG_{:04}.CR2", i))
        .collect()
}

/// Staged JPG keys for an `n`-file batch.
pub fn staged_jpg_keys(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("staging/IMG_{:04}.jpg", i))
        .collect()
}

/// A job parked in `processing` with a remote project attached.
pub fn processing_job(
    job_id: &str,
    gallery_id: Option<&str>,
    project_id: &str,
) -> ProcessingJob {
    let mut job = ProcessingJob::new(job_id, gallery_id.map(String::from), staged_raw_keys(2));
    job.status = JobStatus::Processing;
    job.remote_project_id = Some(project_id.to_string());
    job
}

/// A job parked in `exporting` with a remote project attached.
pub fn exporting_job(job_id: &str, gallery_id: Option<&str>, project_id: &str) -> ProcessingJob {
    let mut job = processing_job(job_id, gallery_id, project_id);
    job.status = JobStatus::Exporting;
    job
}

/// Same as [`exporting_job`] but routed to the review queue.
pub fn exporting_imagen_job(job_id: &str, project_id: &str) -> ProcessingJob {
    let mut job = exporting_job(job_id, None, project_id);
    job.source = Some(JobSource::Imagen);
    job
}

/// A gallery seeded with `n` existing images.
pub fn gallery_with_images(gallery_id: &str, n: usize) -> Gallery {
    let mut gallery = Gallery::new(gallery_id);
    for i in 0..n {
        gallery.images.push(GalleryImage {
            key: format!("galleries/{}/finished/existing-{}.jpg", gallery_id, i),
            alt: format!("existing {}", i),
        });
    }
    gallery
}
