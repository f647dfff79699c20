//! Conversation threads derived from flat message lists.
//!
//! The server only knows individual messages. A thread is one entry per
//! counterparty, rebuilt from scratch on every refresh:
//!
//! 1. received + sent are merged and stably sorted by `sent_at` ascending
//! 2. each message is keyed by the party that is not the current user
//! 3. messages fold into their thread; the last one folded is the latest
//! 4. unread = received by the current user and not yet read
//! 5. threads are ordered by their last message, newest first

use std::collections::{HashMap, HashSet};

use crate::models::{Message, MessageThread, UserRef};

/// Nickname shown when the directory could not resolve a user
pub fn fallback_nickname(user_id: i64) -> String {
    format!("User {}", user_id)
}

/// Distinct counterparties in first-seen order
pub fn counterparties<'a>(me: i64, messages: impl IntoIterator<Item = &'a Message>) -> Vec<i64> {
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .map(|m| m.other_party(me))
        .filter(|id| seen.insert(*id))
        .collect()
}

pub fn derive_threads(
    me: i64,
    received: Vec<Message>,
    sent: Vec<Message>,
    nicknames: &HashMap<i64, String>,
) -> Vec<MessageThread> {
    let mut all: Vec<Message> = received.into_iter().chain(sent).collect();
    all.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));

    let mut seen_ids = HashSet::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut threads: Vec<MessageThread> = Vec::new();

    for message in all {
        // A message to oneself shows up in both lists
        if !seen_ids.insert(message.id) {
            continue;
        }

        let other = message.other_party(me);
        let unread = message.is_unread_for(me);

        let slot = *index.entry(other).or_insert_with(|| {
            threads.push(MessageThread {
                id: other,
                other_user: UserRef {
                    id: other,
                    nickname: nicknames
                        .get(&other)
                        .cloned()
                        .unwrap_or_else(|| fallback_nickname(other)),
                },
                messages: Vec::new(),
                last_message: message.clone(),
                unread_count: 0,
            });
            threads.len() - 1
        });

        let thread = &mut threads[slot];
        thread.last_message = message.clone();
        if unread {
            thread.unread_count += 1;
        }
        thread.messages.push(message);
    }

    threads.sort_by(|a, b| b.last_message.sent_at.cmp(&a.last_message.sent_at));
    threads
}

/// Sum of unread counts across threads
pub fn total_unread(threads: &[MessageThread]) -> usize {
    threads.iter().map(|t| t.unread_count).sum()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    pub(crate) fn msg(id: i64, from: i64, to: i64, minute: i64, is_read: bool) -> Message {
        Message {
            id,
            sender_id: from,
            receiver_id: to,
            content: format!("message {}", id),
            sent_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minute),
            is_read,
        }
    }

    fn names() -> HashMap<i64, String> {
        HashMap::from([(2, "Bora".to_string()), (3, "Chul".to_string())])
    }

    #[test]
    fn test_example_scenario() {
        let received = vec![msg(10, 2, 1, 1, false)];
        let sent = vec![msg(11, 1, 2, 2, true)];

        let threads = derive_threads(1, received, sent, &names());
        assert_eq!(threads.len(), 1);

        let thread = &threads[0];
        assert_eq!(thread.id, 2);
        assert_eq!(thread.other_user.id, 2);
        assert_eq!(thread.other_user.nickname, "Bora");
        assert_eq!(thread.unread_count, 1);
        assert_eq!(thread.last_message.id, 11);
        let ids: Vec<i64> = thread.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn test_one_thread_per_counterparty() {
        let received = vec![
            msg(1, 2, 1, 1, true),
            msg(2, 3, 1, 2, false),
            msg(3, 2, 1, 5, false),
            msg(4, 4, 1, 3, true),
        ];
        let sent = vec![msg(5, 1, 3, 4, false), msg(6, 1, 5, 6, false)];

        let threads = derive_threads(1, received.clone(), sent.clone(), &names());
        let mut ids: Vec<i64> = threads.iter().map(|t| t.id).collect();
        ids.sort();
        assert_eq!(ids, vec![2, 3, 4, 5]);

        let all: Vec<Message> = received.into_iter().chain(sent).collect();
        assert_eq!(counterparties(1, &all).len(), 4);
    }

    #[test]
    fn test_unread_counts_only_received_unread() {
        let received = vec![
            msg(1, 2, 1, 1, false),
            msg(2, 2, 1, 2, false),
            msg(3, 2, 1, 3, true),
        ];
        // Unread flag on a sent message belongs to the other side
        let sent = vec![msg(4, 1, 2, 4, false)];

        let threads = derive_threads(1, received, sent, &names());
        assert_eq!(threads[0].unread_count, 2);
        assert_eq!(total_unread(&threads), 2);
    }

    #[test]
    fn test_sending_does_not_change_unread() {
        let received = vec![msg(1, 2, 1, 1, false)];
        let before = derive_threads(1, received.clone(), vec![], &names());
        let after = derive_threads(1, received, vec![msg(2, 1, 2, 2, false)], &names());
        assert_eq!(total_unread(&before), total_unread(&after));
    }

    #[test]
    fn test_last_message_is_latest_regardless_of_input_order() {
        let received = vec![msg(3, 2, 1, 9, true), msg(1, 2, 1, 1, true)];
        let sent = vec![msg(2, 1, 2, 5, true)];

        let threads = derive_threads(1, received, sent, &names());
        let thread = &threads[0];
        assert_eq!(thread.last_message.id, 3);
        let max = thread.messages.iter().map(|m| m.sent_at).max().unwrap();
        assert_eq!(thread.last_message.sent_at, max);
        assert!(thread
            .messages
            .windows(2)
            .all(|w| w[0].sent_at <= w[1].sent_at));
    }

    #[test]
    fn test_threads_newest_first_with_stable_ties() {
        let received = vec![
            msg(1, 2, 1, 1, true),
            msg(2, 3, 1, 7, true),
            msg(3, 4, 1, 7, true),
            msg(4, 5, 1, 3, true),
        ];

        let threads = derive_threads(1, received, vec![], &names());
        let order: Vec<i64> = threads.iter().map(|t| t.id).collect();
        // 3 and 4 tie at minute 7; 3 was seen first
        assert_eq!(order, vec![3, 4, 5, 2]);
    }

    #[test]
    fn test_fallback_nickname_and_self_message_dedup() {
        let me_to_me = msg(1, 1, 1, 1, false);
        let threads = derive_threads(1, vec![me_to_me.clone()], vec![me_to_me], &HashMap::new());
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].messages.len(), 1);
        assert_eq!(threads[0].other_user.nickname, "User 1");
        assert_eq!(threads[0].unread_count, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(derive_threads(1, vec![], vec![], &HashMap::new()).is_empty());
    }
}
