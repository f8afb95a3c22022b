//! The binding between one adapter and a consuming viewer

use std::fmt;
use std::path::Path;

use crate::error::{Error, NoAdapterError};
use crate::tree::{ContentAdapter, Node, NodeData};

/// Forwards queries to the bound adapter
///
/// A viewer holds a provider and can be re-pointed at another adapter with
/// `set_adapter`. Every query fails with `NoAdapterError` while nothing is
/// bound. The bound adapter is closed when the provider is dropped.
#[derive(Default)]
pub struct TreeNodeProvider {
    adapter: Option<Box<dyn ContentAdapter>>,
}

impl fmt::Debug for TreeNodeProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNodeProvider")
            .field("adapter", &self.adapter.as_ref().map(|a| a.kind()))
            .finish()
    }
}

impl TreeNodeProvider {
    pub fn new(adapter: Option<Box<dyn ContentAdapter>>) -> Self {
        Self { adapter }
    }

    pub fn with_adapter(adapter: Box<dyn ContentAdapter>) -> Self {
        Self::new(Some(adapter))
    }

    /// Bind `adapter`, handing back the previous one as is
    pub fn set_adapter(
        &mut self,
        adapter: Box<dyn ContentAdapter>,
    ) -> Option<Box<dyn ContentAdapter>> {
        self.adapter.replace(adapter)
    }

    /// Unbind and return the adapter without closing it
    pub fn take_adapter(&mut self) -> Option<Box<dyn ContentAdapter>> {
        self.adapter.take()
    }

    pub fn has_adapter(&self) -> bool {
        self.adapter.is_some()
    }

    pub fn adapter(&self) -> Result<&dyn ContentAdapter, NoAdapterError> {
        self.adapter.as_deref().ok_or(NoAdapterError)
    }

    fn adapter_mut(&mut self) -> Result<&mut (dyn ContentAdapter + 'static), NoAdapterError> {
        self.adapter.as_deref_mut().ok_or(NoAdapterError)
    }

    pub fn open(&mut self, locator: &Path) -> Result<(), Error> {
        self.adapter_mut()?.open(locator)?;
        Ok(())
    }

    pub fn root(&self) -> Result<Vec<Node>, NoAdapterError> {
        Ok(self.adapter()?.root())
    }

    pub fn children(&self, node: &Node) -> Result<Vec<Node>, NoAdapterError> {
        Ok(self.adapter()?.children(node))
    }

    pub fn has_children(&self, node: &Node) -> Result<bool, NoAdapterError> {
        Ok(self.adapter()?.has_children(node))
    }

    /// Data for `node`; read failures come back as `NodeData::Empty`
    pub fn node_data(&self, node: &Node) -> Result<NodeData, NoAdapterError> {
        Ok(self.adapter()?.node_data(node))
    }

    pub fn close(&mut self) -> Result<(), NoAdapterError> {
        self.adapter_mut()?.close();
        Ok(())
    }
}

impl Drop for TreeNodeProvider {
    fn drop(&mut self) {
        if let Some(adapter) = self.adapter.as_mut() {
            adapter.close();
        }
    }
}
