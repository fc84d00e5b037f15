//! Synthetic student data
//!
//! Generates labelled records whose dropout probability rises with low
//! attendance, low CGPA, backlogs, missing assignments and pending fees.

use super::record::StudentRecord;
use crate::error::{Error, Result};
use rand::distributions::{Bernoulli, Distribution};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Beta, Normal, Poisson};

fn distribution_error(e: impl std::fmt::Display) -> Error {
    Error::Distribution(e.to_string())
}

/// Generate `n_samples` labelled records with a fixed seed
pub fn generate_sample_data(n_samples: usize, seed: u64) -> Result<Vec<StudentRecord>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let attendance_dist = Normal::new(75.0, 15.0).map_err(distribution_error)?;
    let cgpa_dist = Normal::new(7.0, 1.5).map_err(distribution_error)?;
    let backlog_dist = Poisson::new(1.0).map_err(distribution_error)?;
    let assignment_dist = Poisson::new(8.0).map_err(distribution_error)?;
    let fee_dist = Beta::new(2.0, 5.0).map_err(distribution_error)?;

    let records: Vec<StudentRecord> = (0..n_samples)
        .map(|_| {
            let attendance: f64 = attendance_dist.sample(&mut rng);
            let cgpa: f64 = cgpa_dist.sample(&mut rng);
            let backlogs: f64 = backlog_dist.sample(&mut rng);
            let assignments: f64 = assignment_dist.sample(&mut rng);
            let fee_ratio: f64 = fee_dist.sample(&mut rng);

            let attendance = attendance.clamp(0.0, 100.0);
            let cgpa = cgpa.clamp(0.0, 10.0);
            let backlogs = backlogs.clamp(0.0, 10.0);
            let assignments = assignments.clamp(0.0, 15.0);
            let fee_ratio = fee_ratio.clamp(0.0, 1.0);

            let p = dropout_probability(attendance, cgpa, backlogs, assignments, fee_ratio);
            let dropout = Bernoulli::new(p)
                .map(|d| d.sample(&mut rng))
                .unwrap_or(false);

            StudentRecord::new(attendance, cgpa, backlogs, assignments, fee_ratio)
                .with_dropout(u8::from(dropout))
        })
        .collect();

    Ok(records)
}

/// Ground-truth dropout probability used by the generator
pub fn dropout_probability(
    attendance: f64,
    cgpa: f64,
    backlogs: f64,
    assignments_submitted: f64,
    pending_fee_ratio: f64,
) -> f64 {
    let p = (100.0 - attendance) / 100.0 * 0.3
        + (10.0 - cgpa) / 10.0 * 0.2
        + backlogs / 10.0 * 0.2
        + (15.0 - assignments_submitted) / 15.0 * 0.1
        + pending_fee_ratio * 0.2;
    p.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawField;

    #[test]
    fn test_generate_is_reproducible() {
        let a = generate_sample_data(50, 42).unwrap();
        let b = generate_sample_data(50, 42).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, generate_sample_data(50, 7).unwrap());
    }

    #[test]
    fn test_generated_ranges() {
        let records = generate_sample_data(500, 42).unwrap();

        for r in &records {
            let att = r.value(RawField::Attendance).unwrap();
            let cgpa = r.value(RawField::Cgpa).unwrap();
            let backlogs = r.value(RawField::Backlogs).unwrap();
            let fee = r.value(RawField::PendingFeeRatio).unwrap();
            assert!((0.0..=100.0).contains(&att));
            assert!((0.0..=10.0).contains(&cgpa));
            assert!((0.0..=10.0).contains(&backlogs));
            assert_eq!(backlogs.fract(), 0.0);
            assert!((0.0..=1.0).contains(&fee));
            assert!(matches!(r.dropout, Some(0) | Some(1)));
        }

        let dropouts = records.iter().filter(|r| r.dropout == Some(1)).count();
        assert!(dropouts > 0 && dropouts < records.len());
    }

    #[test]
    fn test_bad_distribution_parameters_are_errors() {
        let err = Poisson::<f64>::new(-1.0).map_err(distribution_error).unwrap_err();
        assert!(matches!(err, Error::Distribution(_)));
        assert!(err.to_string().starts_with("Invalid distribution"));
    }

    #[test]
    fn test_dropout_probability_monotone() {
        let healthy = dropout_probability(95.0, 9.0, 0.0, 14.0, 0.0);
        let struggling = dropout_probability(50.0, 3.0, 5.0, 2.0, 0.8);
        assert!(healthy < struggling);
        assert!((0.0..=1.0).contains(&healthy));
        assert!((0.0..=1.0).contains(&struggling));
    }
}
