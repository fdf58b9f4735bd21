//! Classification metrics
//!
//! Binary metrics treat class index 1 as the positive class. Ratios with a
//! zero denominator evaluate to 0.

use crate::error::{HeartIqError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positive class index for binary metrics
pub const POSITIVE_CLASS: usize = 1;

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(HeartIqError::ShapeError {
            expected: format!("{} predictions", a),
            actual: format!("{} predictions", b),
        });
    }
    Ok(())
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn harmonic(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Confusion matrix with true classes as rows and predicted classes as columns
pub fn confusion_matrix(y_true: &[usize], y_pred: &[usize], n_classes: usize) -> Result<Array2<usize>> {
    check_lengths(y_true.len(), y_pred.len())?;
    let mut matrix = Array2::zeros((n_classes, n_classes));
    for (&t, &p) in y_true.iter().zip(y_pred) {
        if t >= n_classes {
            return Err(HeartIqError::UnknownClass(t));
        }
        if p >= n_classes {
            return Err(HeartIqError::UnknownClass(p));
        }
        matrix[[t, p]] += 1;
    }
    Ok(matrix)
}

/// `(tp, fp, tn, fn)` for `class` treated as positive
fn one_vs_rest(y_true: &[usize], y_pred: &[usize], class: usize) -> (usize, usize, usize, usize) {
    let mut counts = (0, 0, 0, 0);
    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t == class, p == class) {
            (true, true) => counts.0 += 1,
            (false, true) => counts.1 += 1,
            (false, false) => counts.2 += 1,
            (true, false) => counts.3 += 1,
        }
    }
    counts
}

pub fn accuracy_score(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(ratio(correct, y_true.len()))
}

pub fn precision_score(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let (tp, fp, _, _) = one_vs_rest(y_true, y_pred, POSITIVE_CLASS);
    Ok(ratio(tp, tp + fp))
}

pub fn recall_score(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    let (tp, _, _, fn_) = one_vs_rest(y_true, y_pred, POSITIVE_CLASS);
    Ok(ratio(tp, tp + fn_))
}

/// F1 score of the positive class
pub fn f1_score(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    Ok(harmonic(precision_score(y_true, y_pred)?, recall_score(y_true, y_pred)?))
}

/// Receiver operating characteristic curve
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    /// Decreasing score thresholds; the first is `+inf`
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Area under the curve by the trapezoidal rule
    pub fn auc(&self) -> f64 {
        self.fpr
            .windows(2)
            .zip(self.tpr.windows(2))
            .map(|(x, y)| (x[1] - x[0]) * (y[1] + y[0]) / 2.0)
            .sum()
    }
}

/// ROC curve of positive-class scores. Samples with equal scores are
/// grouped into one step so ties do not depend on row order.
pub fn roc_curve(y_true: &[usize], scores: &[f64]) -> Result<RocCurve> {
    check_lengths(y_true.len(), scores.len())?;
    let positives = y_true.iter().filter(|&&t| t == POSITIVE_CLASS).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(HeartIqError::ValidationError(
            "ROC curve needs both positive and negative samples".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut curve = RocCurve {
        fpr: vec![0.0],
        tpr: vec![0.0],
        thresholds: vec![f64::INFINITY],
    };
    let (mut tp, mut fp) = (0usize, 0usize);
    let mut i = 0;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if y_true[order[i]] == POSITIVE_CLASS {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        curve.fpr.push(ratio(fp, negatives));
        curve.tpr.push(ratio(tp, positives));
        curve.thresholds.push(threshold);
    }
    Ok(curve)
}

/// Area under the ROC curve of positive-class scores
pub fn roc_auc_score(y_true: &[usize], scores: &[f64]) -> Result<f64> {
    Ok(roc_curve(y_true, scores)?.auc())
}

/// Precision, recall, F1 and support of one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class metrics with macro and weighted averages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub labels: Vec<String>,
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    /// Build a report for classes `0..labels.len()`
    pub fn new(y_true: &[usize], y_pred: &[usize], labels: &[String]) -> Result<Self> {
        check_lengths(y_true.len(), y_pred.len())?;
        let classes: Vec<ClassMetrics> = (0..labels.len())
            .map(|class| {
                let (tp, fp, _, fn_) = one_vs_rest(y_true, y_pred, class);
                let precision = ratio(tp, tp + fp);
                let recall = ratio(tp, tp + fn_);
                ClassMetrics {
                    precision,
                    recall,
                    f1_score: harmonic(precision, recall),
                    support: tp + fn_,
                }
            })
            .collect();

        let total = y_true.len();
        let k = classes.len().max(1) as f64;
        let macro_avg = ClassMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / k,
            f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / k,
            support: total,
        };
        let weight = |f: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1_score: weight(|c| c.f1_score),
            support: total,
        };

        Ok(Self {
            labels: labels.to_vec(),
            accuracy: accuracy_score(y_true, y_pred)?,
            classes,
            macro_avg,
            weighted_avg,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(String::len)
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(f, "{:>width$} {:>10} {:>10} {:>10} {:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{:>width$} {:>10.2} {:>10.2} {:>10.2} {:>10}",
                name, m.precision, m.recall, m.f1_score, m.support
            )
        };
        for (label, metrics) in self.labels.iter().zip(&self.classes) {
            row(&mut *f, label, metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>10} {:>10} {:>10.2} {:>10}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(&mut *f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

/// Summary metrics of a binary classifier on a labelled set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// None when the set holds a single class
    pub auc_roc: Option<f64>,
    pub n_samples: usize,
}

impl ModelMetrics {
    pub fn compute(y_true: &[usize], y_pred: &[usize], scores: &[f64]) -> Result<Self> {
        Ok(Self {
            accuracy: accuracy_score(y_true, y_pred)?,
            precision: precision_score(y_true, y_pred)?,
            recall: recall_score(y_true, y_pred)?,
            f1_score: f1_score(y_true, y_pred)?,
            auc_roc: roc_auc_score(y_true, scores).ok(),
            n_samples: y_true.len(),
        })
    }
}
