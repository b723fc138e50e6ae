use crate::history::MoodHistory;
use crate::playlist::playlist_for;
use crate::predictor::predict_next;
use crate::{ClassifiedPost, Emotion};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How often each emotion occurred in a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmotionDistribution {
    counts: BTreeMap<Emotion, usize>,
    total: usize,
}

impl EmotionDistribution {
    pub fn from_posts(posts: &[ClassifiedPost]) -> Self {
        let mut counts = BTreeMap::new();
        for post in posts {
            *counts.entry(post.emotion).or_insert(0) += 1;
        }
        Self {
            counts,
            total: posts.len(),
        }
    }

    pub fn count(&self, emotion: Emotion) -> usize {
        self.counts.get(&emotion).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Fraction of posts labelled `emotion`, in `0.0..=1.0`.
    pub fn share(&self, emotion: Emotion) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(emotion) as f64 / self.total as f64
        }
    }

    /// Observed emotions, most frequent first.
    pub fn entries(&self) -> Vec<(Emotion, usize)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(e, c)| (*e, *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
    }
}

/// Emotion counts for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyEmotionCounts {
    pub date: NaiveDate,
    pub counts: BTreeMap<Emotion, usize>,
}

/// Groups posts by UTC day.
///
/// Every emotion seen anywhere in `posts` gets an entry on every day, and
/// days without posts between the first and last day are included with
/// zero counts.
pub fn daily_counts(posts: &[ClassifiedPost]) -> Vec<DailyEmotionCounts> {
    let observed: BTreeSet<Emotion> = posts.iter().map(|p| p.emotion).collect();
    let dates = posts.iter().map(|p| p.created_at.date_naive());
    let (first, last) = match (dates.clone().min(), dates.max()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Vec::new(),
    };

    let mut days: BTreeMap<NaiveDate, BTreeMap<Emotion, usize>> =
        std::iter::successors(Some(first), |day| day.succ_opt().filter(|next| *next <= last))
            .map(|day| (day, observed.iter().map(|e| (*e, 0)).collect()))
            .collect();

    for post in posts {
        if let Some(counts) = days.get_mut(&post.created_at.date_naive()) {
            *counts.entry(post.emotion).or_insert(0) += 1;
        }
    }

    days.into_iter()
        .map(|(date, counts)| DailyEmotionCounts { date, counts })
        .collect()
}

/// Everything a successful run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub posts: Vec<ClassifiedPost>,
    pub distribution: EmotionDistribution,
    pub daily: Vec<DailyEmotionCounts>,
    pub predicted_mood: Emotion,
    pub playlist_url: &'static str,
}

impl AnalysisReport {
    /// Aggregates a run's results. Returns `None` when nothing was classified.
    pub fn build(posts: Vec<ClassifiedPost>, history: &MoodHistory) -> Option<Self> {
        if posts.is_empty() || history.is_empty() {
            return None;
        }
        let predicted_mood = predict_next(&history.snapshot())?;

        Some(Self {
            distribution: EmotionDistribution::from_posts(&posts),
            daily: daily_counts(&posts),
            playlist_url: playlist_for(predicted_mood),
            predicted_mood,
            posts,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed(AnalysisReport),
    /// No post survived cleaning, so there is nothing to predict from.
    NoValidData,
}

impl RunOutcome {
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::NoValidData => None,
        }
    }
}
