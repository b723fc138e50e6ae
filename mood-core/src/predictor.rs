//! Next-mood heuristic over the recent mood history.
//!
//! Rules are checked in order and the first match wins:
//!
//! 1. a history made only of `neutral` stays `neutral`
//! 2. three or more `sadness`/`anger` entries together give `disgust`
//! 3. three or more `joy` entries give `joy`
//! 4. a change between the last two entries gives `fear`
//! 5. otherwise the latest mood carries on
//!
//! Rules 2 and 3 can both hold for the same history; rule 2 wins.

use crate::Emotion;

/// Recommends the next mood, or `None` when there is no history to go on.
pub fn predict_next(history: &[Emotion]) -> Option<Emotion> {
    let last = *history.last()?;

    if history.iter().all(|e| *e == Emotion::Neutral) {
        return Some(Emotion::Neutral);
    }

    let count = |target: Emotion| history.iter().filter(|e| **e == target).count();

    if count(Emotion::Sadness) + count(Emotion::Anger) >= 3 {
        return Some(Emotion::Disgust);
    }

    if count(Emotion::Joy) >= 3 {
        return Some(Emotion::Joy);
    }

    if let [.., second_last, _] = history {
        if *second_last != last {
            return Some(Emotion::Fear);
        }
    }

    Some(last)
}
