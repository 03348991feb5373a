use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

use futures_util::FutureExt;
use serde::Serialize;
use tracing::{error, info};

use crate::classifier::{Classification, Sentiment, SentimentClassifier};
use crate::dataset::Dataset;
use crate::inference::ModelConnector;
use crate::prompts;
use crate::reply::ReplyGenerator;

/// Status line and reply text, exactly as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewReply {
    pub status: String,
    pub reply: String,
}

impl ReviewReply {
    fn new(status: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            reply: reply.into(),
        }
    }
}

/// Entry point for both user actions. Holds no per-request state.
pub struct ReviewService {
    connector: Arc<ModelConnector>,
    classifier: SentimentClassifier,
    generator: ReplyGenerator,
    dataset: Arc<Dataset>,
}

impl ReviewService {
    pub fn new(connector: Arc<ModelConnector>, dataset: Arc<Dataset>) -> Self {
        Self {
            classifier: SentimentClassifier::new(&connector),
            generator: ReplyGenerator::new(&connector),
            connector,
            dataset,
        }
    }

    pub fn connector(&self) -> &ModelConnector {
        &self.connector
    }

    /// "Fill example" action.
    pub fn example(&self) -> String {
        self.dataset.sample_one()
    }

    /// "Generate reply" action. Always returns a displayable pair.
    pub async fn process(&self, review: &str) -> ReviewReply {
        let catalog = prompts::catalog();

        if review.trim().is_empty() {
            return ReviewReply::new(
                Sentiment::Neutral.display_label(),
                &catalog.messages.empty_review,
            );
        }

        if !self.connector.is_configured() {
            return ReviewReply::new(
                Sentiment::Error.display_label(),
                &catalog.messages.api_not_configured,
            );
        }

        match AssertUnwindSafe(self.classify_and_reply(review))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                error!("review processing panicked: {detail}");
                ReviewReply::new(
                    Sentiment::Error.display_label(),
                    format!("{}: {detail}", catalog.messages.unexpected_error),
                )
            }
        }
    }

    async fn classify_and_reply(&self, review: &str) -> ReviewReply {
        let Classification { label, stars } = self.classifier.classify(review).await;
        let reply = self.generator.generate(review, stars).await;
        info!(?label, stars, "reply generated");

        ReviewReply::new(
            format!(
                "{} ({stars} {})",
                label.display_label(),
                prompts::catalog().messages.stars_suffix
            ),
            reply,
        )
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}
