//! Deterministic event ordering.
//!
//! Log index is unique within a block, so (block number, log index) totally
//! orders a batch the same way the chain confirmed it.

use crate::domain::DomainEvent;

/// Stable ordering key for delivered events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventOrderingKey {
    pub block_number: u64,
    pub log_index: u32,
}

impl EventOrderingKey {
    pub fn from_event(event: &DomainEvent) -> Self {
        EventOrderingKey {
            block_number: event.meta.block_number,
            log_index: event.meta.log_index,
        }
    }
}

/// Sort a batch into confirmed on-chain order.
pub fn sort_events_deterministic(events: &mut [DomainEvent]) {
    events.sort_by_key(EventOrderingKey::from_event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, EventBody, EventMeta, Timestamp, TokenId, TxHash};

    fn event(block_number: u64, log_index: u32) -> DomainEvent {
        DomainEvent {
            meta: EventMeta {
                emitter: Address::new("0x1111111111111111111111111111111111111111"),
                tx_sender: Address::new("0x2222222222222222222222222222222222222222"),
                tx_hash: TxHash::new("0xabc"),
                log_index,
                block_number,
                block_timestamp: Timestamp::new(0),
            },
            body: EventBody::Burned {
                token_id: TokenId::new(1),
            },
        }
    }

    #[test]
    fn test_sorts_by_block_then_log_index() {
        let mut events = vec![event(2, 0), event(1, 5), event(1, 1)];
        sort_events_deterministic(&mut events);

        let keys: Vec<_> = events
            .iter()
            .map(|e| (e.meta.block_number, e.meta.log_index))
            .collect();
        assert_eq!(keys, vec![(1, 1), (1, 5), (2, 0)]);
    }

    #[test]
    fn test_ordering_key_comparison() {
        let earlier = EventOrderingKey {
            block_number: 1,
            log_index: 9,
        };
        let later = EventOrderingKey {
            block_number: 2,
            log_index: 0,
        };
        assert!(earlier < later);
    }
}
