use super::*;

fn jobs_in(name: &str, n: u8) -> (PathBuf, Vec<ClockJob>) {
    let dir = PathBuf::from("target").join("batch_tests").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    let jobs = (0..n)
        .map(|i| ClockJob {
            time: ClockTime::new(i, i * 2, 0).unwrap(),
            out: dir.join(format!("{i:06}.png")),
        })
        .collect();
    (dir, jobs)
}

#[test]
fn sequential_batch_writes_every_job() {
    let (dir, jobs) = jobs_in("sequential", 3);
    let written = render_clock_batch(&jobs, 32, &RenderThreading::default()).unwrap();
    assert_eq!(written, 3);
    for job in &jobs {
        assert!(job.out.exists());
    }
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 3);
}

#[test]
fn parallel_batch_matches_sequential_output() {
    let (_, seq_jobs) = jobs_in("cmp_seq", 4);
    let (_, par_jobs) = jobs_in("cmp_par", 4);
    render_clock_batch(&seq_jobs, 40, &RenderThreading::default()).unwrap();
    render_clock_batch(
        &par_jobs,
        40,
        &RenderThreading {
            parallel: true,
            threads: Some(2),
        },
    )
    .unwrap();

    for (a, b) in seq_jobs.iter().zip(&par_jobs) {
        assert_eq!(std::fs::read(&a.out).unwrap(), std::fs::read(&b.out).unwrap());
    }
}

#[test]
fn zero_threads_is_rejected() {
    let (_, jobs) = jobs_in("zero_threads", 1);
    let err = render_clock_batch(
        &jobs,
        32,
        &RenderThreading {
            parallel: true,
            threads: Some(0),
        },
    )
    .unwrap_err();
    assert!(matches!(err, LapseError::Validation(_)));
}

#[test]
fn invalid_size_fails_before_writing() {
    let (dir, jobs) = jobs_in("bad_size", 2);
    assert!(render_clock_batch(&jobs, 0, &RenderThreading::default()).is_err());
    assert!(!dir.exists());
}
