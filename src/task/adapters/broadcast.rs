//! Publisher combinator dispatching to two destinations.

use async_trait::async_trait;

use crate::task::{
    domain::{TransitionEvent, UserId},
    ports::{EventPublishResult, TransitionEventPublisher},
};

/// Publishes to `first`, then to `second`.
///
/// Both destinations are always attempted; the first error is returned.
#[derive(Debug, Clone, Default)]
pub struct BroadcastPublisher<A, B> {
    first: A,
    second: B,
}

impl<A, B> BroadcastPublisher<A, B>
where
    A: TransitionEventPublisher,
    B: TransitionEventPublisher,
{
    /// Combines two publishers.
    #[must_use]
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Returns the first destination.
    #[must_use]
    pub const fn first(&self) -> &A {
        &self.first
    }

    /// Returns the second destination.
    #[must_use]
    pub const fn second(&self) -> &B {
        &self.second
    }
}

#[async_trait]
impl<A, B> TransitionEventPublisher for BroadcastPublisher<A, B>
where
    A: TransitionEventPublisher,
    B: TransitionEventPublisher,
{
    async fn publish(&self, owner: UserId, events: &[TransitionEvent]) -> EventPublishResult<()> {
        let first_result = self.first.publish(owner, events).await;
        let second_result = self.second.publish(owner, events).await;
        first_result.and(second_result)
    }
}
