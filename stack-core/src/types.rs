/// Identifier for a node in a [`crate::scene::Scene`].
///
/// This is an index into the scene's slot table, and is only meaningful
/// within the lifetime of a given `Scene` instance. Slots of removed nodes
/// are recycled, so a stale id may later name a different node.
pub type NodeId = usize;

/// Change stamp handed out by a [`crate::scene::Scene`] clock.
///
/// Every data, matrix or topology change stamps the touched node with the
/// next clock value, so "changed since `r`" is simply `revision > r`.
pub type Revision = u64;
