//! Event filters.
//!
//! A subscription carries an ordered filter chain. Before a handler runs,
//! every filter is asked in order; the first one rejecting the event skips
//! this handler only. Filters see the resolved actor, which may be absent.
//!
//! The default chain is [`FilterTag::Players`]: only users currently
//! playing in the listener's session pass.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::core::User;

use super::event::Event;
use super::listener::RegisteredListener;

/// Decides whether a listener receives an event.
pub trait EventFilter {
    /// Return `false` to skip the listener.
    fn filter(&self, event: &dyn Event, listener: &RegisteredListener, actor: Option<&User>)
        -> bool;
}

impl<F> EventFilter for F
where
    F: Fn(&dyn Event, &RegisteredListener, Option<&User>) -> bool,
{
    fn filter(&self, event: &dyn Event, listener: &RegisteredListener, actor: Option<&User>) -> bool {
        self(event, listener, actor)
    }
}

/// Which session members pass a [`MembershipFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Membership {
    /// Users playing in the session.
    Playing,
    /// Users spectating the session.
    Spectating,
    /// Users playing or spectating.
    Participating,
    /// Any resolved user, member or not.
    Anyone,
}

/// Treatment of events without a resolvable actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnonymousPolicy {
    /// Events without an actor are rejected.
    #[default]
    Reject,
    /// Events without an actor pass.
    Pass,
}

/// Filters on the actor's membership in the listener's session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MembershipFilter {
    pub membership: Membership,
    pub anonymous: AnonymousPolicy,
}

impl MembershipFilter {
    /// Filter on `membership`, rejecting anonymous events.
    #[must_use]
    pub const fn new(membership: Membership) -> Self {
        Self {
            membership,
            anonymous: AnonymousPolicy::Reject,
        }
    }

    /// Let anonymous events pass (builder pattern).
    #[must_use]
    pub const fn allow_anonymous(mut self) -> Self {
        self.anonymous = AnonymousPolicy::Pass;
        self
    }
}

impl EventFilter for MembershipFilter {
    fn filter(&self, _event: &dyn Event, listener: &RegisteredListener, actor: Option<&User>) -> bool {
        let Some(user) = actor else {
            return self.anonymous == AnonymousPolicy::Pass;
        };
        let session = listener.session();
        match self.membership {
            Membership::Playing => session.is_playing(user),
            Membership::Spectating => session.is_spectating(user),
            Membership::Participating => session.is_playing(user) || session.is_spectating(user),
            Membership::Anyone => true,
        }
    }
}

/// Lets every event through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AcceptAll;

impl EventFilter for AcceptAll {
    fn filter(&self, _event: &dyn Event, _listener: &RegisteredListener, _actor: Option<&User>) -> bool {
        true
    }
}

/// Declarative filter selection for subscriptions.
#[derive(Clone, Default)]
pub enum FilterTag {
    /// Actor must be playing.
    #[default]
    Players,
    /// Actor must be spectating.
    Spectators,
    /// Actor must be playing or spectating.
    Participants,
    /// Actor must be resolved.
    AnyUser,
    /// Actor must be playing, or absent.
    PlayersOrAnonymous,
    /// No restriction.
    Everyone,
    /// A custom filter.
    Custom(Rc<dyn EventFilter>),
}

impl FilterTag {
    /// Build the filter this tag stands for.
    #[must_use]
    pub fn instantiate(&self) -> Rc<dyn EventFilter> {
        match self {
            Self::Players => Rc::new(MembershipFilter::new(Membership::Playing)),
            Self::Spectators => Rc::new(MembershipFilter::new(Membership::Spectating)),
            Self::Participants => Rc::new(MembershipFilter::new(Membership::Participating)),
            Self::AnyUser => Rc::new(MembershipFilter::new(Membership::Anyone)),
            Self::PlayersOrAnonymous => {
                Rc::new(MembershipFilter::new(Membership::Playing).allow_anonymous())
            }
            Self::Everyone => Rc::new(AcceptAll),
            Self::Custom(filter) => Rc::clone(filter),
        }
    }

    /// Wrap a custom filter.
    pub fn custom(filter: impl EventFilter + 'static) -> Self {
        Self::Custom(Rc::new(filter))
    }
}

impl std::fmt::Debug for FilterTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Players => f.write_str("Players"),
            Self::Spectators => f.write_str("Spectators"),
            Self::Participants => f.write_str("Participants"),
            Self::AnyUser => f.write_str("AnyUser"),
            Self::PlayersOrAnonymous => f.write_str("PlayersOrAnonymous"),
            Self::Everyone => f.write_str("Everyone"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// An instantiated filter chain. Most chains hold one or two filters.
pub type FilterChain = SmallVec<[Rc<dyn EventFilter>; 2]>;

/// Instantiate a chain from tags, preserving order.
#[must_use]
pub fn build_chain(tags: &[FilterTag]) -> FilterChain {
    tags.iter().map(FilterTag::instantiate).collect()
}
