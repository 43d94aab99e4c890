use async_trait::async_trait;
use uuid::Uuid;

/// What a mutation entry point is about to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageTarget {
    Enrolment(Uuid),
    Plan(Uuid),
    /// A plan slot that may not exist yet.
    Assignment { user_id: Uuid, entity_id: Uuid },
    Group(Uuid),
}

/// Permission gate consulted before any mutation. A `false` answer is a hard
/// stop; no partial effect may have happened by then.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn can_manage(&self, actor: Option<Uuid>, target: ManageTarget) -> bool;
}

/// Grants everything. For tests and trusted internal callers.
pub struct AllowAll;

#[async_trait]
impl Authorizer for AllowAll {
    async fn can_manage(&self, _actor: Option<Uuid>, _target: ManageTarget) -> bool {
        true
    }
}

/// Denies everything. Useful to verify the hard-stop behavior.
pub struct DenyAll;

#[async_trait]
impl Authorizer for DenyAll {
    async fn can_manage(&self, _actor: Option<Uuid>, _target: ManageTarget) -> bool {
        false
    }
}
