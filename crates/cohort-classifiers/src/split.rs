//! Seeded, optionally stratified train/test partitioning.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::SplitConfig;
use crate::data_handling::{class_counts, ClassLabels};
use crate::error::{ClassifierError, Result};

/// Row indices of each side of a split. Together they cover every row once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of test rows for `n_samples` rows: `ceil(test_fraction * n)`.
pub fn test_size(n_samples: usize, test_fraction: f64) -> usize {
    (test_fraction * n_samples as f64).ceil() as usize
}

/// Partition rows into train and test sets.
///
/// `y` holds the class code of every row and `classes` names the codes (used
/// for error messages). Identical inputs and seed always give identical
/// partitions.
///
/// Errors, in the order they are checked:
/// * `InvalidConfig` when `test_fraction` is outside `(0, 1)`;
/// * `InsufficientSamples` when either side would be empty;
/// * `SingleClass` when fewer than two classes are present (stratified);
/// * `InsufficientClassMembers` when a class has a single row (stratified);
/// * `InsufficientSamples` when a side cannot hold one row per class
///   (stratified).
pub fn train_test_split(
    y: &[usize],
    classes: &ClassLabels,
    config: &SplitConfig,
) -> Result<SplitIndices> {
    config.validate()?;

    let n_samples = y.len();
    let n_test = test_size(n_samples, config.test_fraction);
    let n_train = n_samples.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(ClassifierError::InsufficientSamples(format!(
            "{} rows with test_fraction {} leaves {} train and {} test rows",
            n_samples, config.test_fraction, n_train, n_test
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut split = if config.stratify {
        stratified_indices(y, classes, n_test, n_train, &mut rng)?
    } else {
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(&mut rng);
        let train = indices.split_off(n_test);
        SplitIndices {
            train,
            test: indices,
        }
    };

    split.train.shuffle(&mut rng);
    split.test.shuffle(&mut rng);

    log::debug!(
        "Split {} rows into {} train / {} test (seed {}, stratify {})",
        n_samples,
        split.train.len(),
        split.test.len(),
        config.seed,
        config.stratify
    );

    Ok(split)
}

fn stratified_indices(
    y: &[usize],
    classes: &ClassLabels,
    n_test: usize,
    n_train: usize,
    rng: &mut StdRng,
) -> Result<SplitIndices> {
    let n_samples = y.len();
    let counts = class_counts(y, classes.len());
    let present: Vec<usize> = (0..counts.len()).filter(|&c| counts[c] > 0).collect();

    if present.len() < 2 {
        return Err(ClassifierError::SingleClass {
            found: present.len(),
        });
    }
    if let Some(&code) = present.iter().find(|&&c| counts[c] < 2) {
        return Err(ClassifierError::InsufficientClassMembers {
            label: classes.label_of(code).unwrap_or("?").to_string(),
            count: counts[code],
        });
    }
    if n_test < present.len() || n_train < present.len() {
        return Err(ClassifierError::InsufficientSamples(format!(
            "{} train / {} test rows cannot hold all {} classes",
            n_train,
            n_test,
            present.len()
        )));
    }

    let allocation = allocate_test_counts(&counts, n_test, n_samples);

    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);
    for &code in &present {
        let mut members: Vec<usize> = (0..n_samples).filter(|&i| y[i] == code).collect();
        members.shuffle(rng);
        let rest = members.split_off(allocation[code]);
        test.extend(members);
        train.extend(rest);
    }

    Ok(SplitIndices { train, test })
}

/// Largest-remainder allocation of `n_test` slots proportional to `counts`.
///
/// Every class keeps at least one row on the train side. Remainder ties go
/// to the lower class code.
fn allocate_test_counts(counts: &[usize], n_test: usize, n_samples: usize) -> Vec<usize> {
    let mut allocation: Vec<usize> = counts
        .iter()
        .map(|&n_k| (n_test * n_k / n_samples).min(n_k.saturating_sub(1)))
        .collect();

    let mut order: Vec<usize> = (0..counts.len()).filter(|&c| counts[c] > 0).collect();
    // Remainder of n_test * n_k / n_samples, compared exactly as integers.
    order.sort_by(|&a, &b| {
        let rem_a = (n_test * counts[a]) % n_samples;
        let rem_b = (n_test * counts[b]) % n_samples;
        rem_b.cmp(&rem_a).then(a.cmp(&b))
    });

    let mut remaining = n_test - allocation.iter().sum::<usize>();
    while remaining > 0 {
        let mut progressed = false;
        for &code in &order {
            if remaining == 0 {
                break;
            }
            if allocation[code] + 1 < counts[code] {
                allocation[code] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    allocation
}
