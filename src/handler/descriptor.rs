//! Handler descriptors: a servlet or filter paired with its context and metadata.

use std::fmt;
use std::sync::Arc;

use crate::handler::context::{ContextId, ServletContext};
use crate::handler::info::{FilterInfo, ServletInfo};
use crate::handler::servlet::{Filter, Servlet, ServletError};

/// One registered servlet.
pub struct ServletDescriptor {
    context_id: ContextId,
    context: Arc<ServletContext>,
    info: ServletInfo,
    servlet: Arc<dyn Servlet>,
}

impl ServletDescriptor {
    pub fn new(
        context_id: ContextId,
        context: Arc<ServletContext>,
        info: ServletInfo,
        servlet: Arc<dyn Servlet>,
    ) -> Self {
        Self {
            context_id,
            context,
            info,
            servlet,
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    pub fn context(&self) -> &Arc<ServletContext> {
        &self.context
    }

    pub fn info(&self) -> &ServletInfo {
        &self.info
    }

    pub fn servlet(&self) -> &Arc<dyn Servlet> {
        &self.servlet
    }

    pub fn ranking(&self) -> i32 {
        self.info.ranking
    }

    /// Run the servlet's init step against this descriptor's context.
    pub fn init(&self) -> Result<(), ServletError> {
        self.servlet.init(&self.context)
    }

    /// Run the servlet's teardown.
    pub fn destroy(&self) {
        self.servlet.destroy();
    }
}

impl fmt::Debug for ServletDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServletDescriptor")
            .field("context_id", &self.context_id)
            .field("context", &self.context.name())
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// One registered filter. Filters are removed by descriptor, never by alias.
pub struct FilterDescriptor {
    context_id: ContextId,
    context: Arc<ServletContext>,
    info: FilterInfo,
    filter: Arc<dyn Filter>,
}

impl FilterDescriptor {
    pub fn new(
        context_id: ContextId,
        context: Arc<ServletContext>,
        info: FilterInfo,
        filter: Arc<dyn Filter>,
    ) -> Self {
        Self {
            context_id,
            context,
            info,
            filter,
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.context_id
    }

    pub fn context(&self) -> &Arc<ServletContext> {
        &self.context
    }

    pub fn info(&self) -> &FilterInfo {
        &self.info
    }

    pub fn filter(&self) -> &Arc<dyn Filter> {
        &self.filter
    }

    pub fn ranking(&self) -> i32 {
        self.info.ranking
    }

    pub fn init(&self) -> Result<(), ServletError> {
        self.filter.init(&self.context)
    }

    pub fn destroy(&self) {
        self.filter.destroy();
    }
}

impl fmt::Debug for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDescriptor")
            .field("context_id", &self.context_id)
            .field("context", &self.context.name())
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
