use crate::Emotion;
use std::collections::VecDeque;

pub const MOOD_HISTORY_CAPACITY: usize = 5;

/// The most recent classified emotions of a run, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MoodHistory {
    entries: VecDeque<Emotion>,
}

impl MoodHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MOOD_HISTORY_CAPACITY),
        }
    }

    /// Appends `emotion`, evicting the oldest entry once the buffer is full.
    pub fn push(&mut self, emotion: Emotion) {
        if self.entries.len() == MOOD_HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(emotion);
    }

    pub fn snapshot(&self) -> Vec<Emotion> {
        self.entries.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Emotion::*;

    #[test]
    fn test_push_keeps_insertion_order() {
        let mut history = MoodHistory::new();
        assert!(history.is_empty());

        history.push(Joy);
        history.push(Anger);
        assert_eq!(history.snapshot(), vec![Joy, Anger]);
    }

    #[test]
    fn test_sixth_push_evicts_oldest() {
        let mut history = MoodHistory::new();
        for emotion in [Joy, Sadness, Anger, Fear, Love] {
            history.push(emotion);
        }
        assert_eq!(history.len(), MOOD_HISTORY_CAPACITY);

        history.push(Disgust);
        assert_eq!(history.len(), MOOD_HISTORY_CAPACITY);
        assert_eq!(
            history.snapshot(),
            vec![Sadness, Anger, Fear, Love, Disgust]
        );
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut history = MoodHistory::new();
        for (i, emotion) in Emotion::ALL.iter().cycle().take(23).enumerate() {
            history.push(*emotion);
            assert_eq!(history.len(), (i + 1).min(MOOD_HISTORY_CAPACITY));
        }
    }
}
