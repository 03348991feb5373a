use std::path::Path;

use rand::{seq::SliceRandom, thread_rng, Rng};
use tracing::{info, warn};

/// Shown by the "fill example" action when no dataset is available.
pub const PLACEHOLDER_REVIEW: &str = "A comida estava deliciosa e o atendimento foi excelente!";

const REVIEW_COLUMN: &str = "Review";
const LIKED_COLUMN: &str = "Liked";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub text: String,
    pub liked: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("cannot read dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset has no `{0}` column")]
    MissingColumn(&'static str),
}

#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<ReviewRecord>,
}

impl Dataset {
    pub fn new(records: Vec<ReviewRecord>) -> Self {
        Self { records }
    }

    /// Load reviews from `path`. Any failure yields an empty dataset.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(dataset) => {
                info!("✓ dataset loaded: {} reviews", dataset.len());
                dataset
            }
            Err(err) => {
                warn!(path = %path.display(), "✗ failed to load dataset: {err}");
                Self::default()
            }
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path.as_ref())?;

        let headers = reader.headers()?.clone();
        let column = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(DatasetError::MissingColumn(name))
        };
        let review_idx = column(REVIEW_COLUMN)?;
        let liked_idx = column(LIKED_COLUMN)?;

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for row in reader.records() {
            let row = row?;
            let text = row.get(review_idx).filter(|t| !t.trim().is_empty());
            let liked = row.get(liked_idx).and_then(parse_flag);
            match (text, liked) {
                (Some(text), Some(liked)) => records.push(ReviewRecord {
                    text: text.to_string(),
                    liked,
                }),
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!("dropped {dropped} incomplete dataset rows");
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    /// Text of one uniformly random review, or the placeholder.
    pub fn sample_one(&self) -> String {
        self.sample_with(&mut thread_rng()).to_string()
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        self.records
            .choose(rng)
            .map(|record| record.text.as_str())
            .unwrap_or(PLACEHOLDER_REVIEW)
    }
}

/// Integer-like flag: `1`, `0`, `1.0`. Anything else counts as missing.
fn parse_flag(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn nonexistent_path_yields_empty_dataset() {
        let dataset = Dataset::load("/definitely/not/here/reviews.csv");
        assert!(dataset.is_empty());
        assert!(Dataset::try_load("/definitely/not/here/reviews.csv").is_err());
    }

    #[test]
    fn incomplete_rows_are_dropped() {
        let file = csv_file(
            "Review,Liked\n\
             \"Ótimo, voltarei\",1\n\
             ,0\n\
             Sem nota,\n\
             Frio demais,0.0\n\
             Estranho,talvez\n",
        );
        let dataset = Dataset::load(file.path());
        assert_eq!(
            dataset.records(),
            &[
                ReviewRecord {
                    text: "Ótimo, voltarei".into(),
                    liked: 1
                },
                ReviewRecord {
                    text: "Frio demais".into(),
                    liked: 0
                },
            ]
        );
    }

    #[test]
    fn column_order_does_not_matter() {
        let file = csv_file("Liked,Review\n1,Muito bom\n");
        let dataset = Dataset::load(file.path());
        assert_eq!(dataset.records()[0].text, "Muito bom");
        assert_eq!(dataset.records()[0].liked, 1);
    }

    #[test]
    fn missing_column_fails_soft() {
        let file = csv_file("Texto,Nota\nBom,1\n");
        assert!(matches!(
            Dataset::try_load(file.path()),
            Err(DatasetError::MissingColumn("Review"))
        ));
        assert!(Dataset::load(file.path()).is_empty());
    }

    #[test]
    fn empty_dataset_returns_placeholder() {
        let dataset = Dataset::default();
        assert_eq!(dataset.sample_one(), PLACEHOLDER_REVIEW);
        assert_eq!(dataset.sample_one(), PLACEHOLDER_REVIEW);
    }

    #[test]
    fn sample_comes_from_dataset() {
        let dataset = Dataset::new(vec![
            ReviewRecord {
                text: "A".into(),
                liked: 1,
            },
            ReviewRecord {
                text: "B".into(),
                liked: 0,
            },
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = dataset.sample_with(&mut rng);
            assert!(picked == "A" || picked == "B");
        }
        assert!(["A", "B"].contains(&dataset.sample_one().as_str()));
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag(" 1 "), Some(1));
        assert_eq!(parse_flag("0.0"), Some(0));
        assert_eq!(parse_flag("1.5"), None);
        assert_eq!(parse_flag(""), None);
        assert_eq!(parse_flag("nan"), None);
    }
}
