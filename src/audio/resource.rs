use std::sync::Arc;

use quietwave_core::transport::ResourceId;
use quietwave_core::workspace::Resource;

/// Where a playable resource's bytes live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// `blob:` URL created by this page; revoked when the last handle drops.
    Local,
    /// URL handed back by a processing backend; not ours to revoke.
    Remote,
}

impl Origin {
    /// Whether the URL is revoked once its last handle is released.
    pub fn revoked_on_release(self) -> bool {
        self == Origin::Local
    }
}

#[derive(Debug)]
struct ObjectUrl {
    url: String,
    origin: Origin,
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        if self.origin.revoked_on_release() {
            if let Err(e) = web_sys::Url::revoke_object_url(&self.url) {
                log::warn!("failed to revoke {}: {:?}", self.url, e);
            } else {
                log::debug!("revoked {}", self.url);
            }
        }
    }
}

/// Cheaply clonable handle to decodable audio. The address stays valid while any clone is alive.
#[derive(Clone, Debug)]
pub struct PlayableResource {
    id: ResourceId,
    inner: Arc<ObjectUrl>,
}

impl PlayableResource {
    /// Mint a `blob:` URL for a file or blob.
    pub fn from_blob(id: ResourceId, blob: &web_sys::Blob) -> Result<Self, String> {
        let url = web_sys::Url::create_object_url_with_blob(blob)
            .map_err(|e| format!("createObjectURL failed: {e:?}"))?;
        log::debug!("created {url} for resource {id}");
        Ok(Self {
            id,
            inner: Arc::new(ObjectUrl { url, origin: Origin::Local }),
        })
    }

    pub fn remote(id: ResourceId, url: String) -> Self {
        Self {
            id,
            inner: Arc::new(ObjectUrl { url, origin: Origin::Remote }),
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn origin(&self) -> Origin {
        self.inner.origin
    }
}

impl PartialEq for PlayableResource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Resource for PlayableResource {
    fn id(&self) -> ResourceId {
        self.id
    }
}
