//! In-memory test doubles for the push engine ports

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail};
use chrono::{DateTime, TimeZone, Utc};
use drivepush_cache::MemoryIndexStore;
use drivepush_core::config::Config;
use drivepush_core::domain::path;
use drivepush_core::domain::{
    Change, FileId, Index, MountPoint, Quota, QuotaStatus, RemoteFile,
};
use drivepush_core::ports::{
    IChangeResolver, IIndexStore, IMountRegistry, IPrompter, IRemoteStore, UpsertRequest,
};
use drivepush_sync::Pusher;

pub const ROOT_ID: &str = "root";

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
}

pub fn local_file(path: &str, size: u64) -> RemoteFile {
    RemoteFile::file(path, size, fixed_time(), Some(format!("sum-{size}")))
}

// ============================================================================
// Remote store
// ============================================================================

/// Remote call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find(String),
    Upsert { path: String, is_dir: bool },
    Trash(String),
    Untrash(String),
    Quota,
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::Upsert { .. } | Call::Trash(_) | Call::Untrash(_)
        )
    }
}

/// Non-standard ways an upsert of one path can behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertQuirk {
    /// The object is written but the call still returns an error
    FailAfterWrite,
    /// The object is written but the call reports no change
    UnchangedAfterWrite,
    /// Nothing is written and the call reports no change
    UnchangedWithoutWrite,
    /// The call fails and later lookups of the path fail too
    FailAndBreakLookup,
}

#[derive(Default)]
struct RemoteState {
    files: BTreeMap<String, RemoteFile>,
    trashed: HashSet<FileId>,
    calls: Vec<Call>,
    next_id: u32,
    failing: HashSet<String>,
    quirks: HashMap<String, UpsertQuirk>,
    broken_lookups: HashSet<String>,
    yield_calls: bool,
    quota: Option<Quota>,
    stall_quota: bool,
}

/// Path-keyed remote that records every call
pub struct MockRemote {
    state: Mutex<RemoteState>,
}

impl MockRemote {
    /// Remote holding only the root directory
    pub fn new() -> Self {
        let remote = Self::empty();
        remote.insert(RemoteFile::directory("/").with_id(FileId::new(ROOT_ID).unwrap()));
        remote
    }

    /// Remote without even a root directory
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(RemoteState::default()),
        }
    }

    fn insert(&self, file: RemoteFile) {
        let mut state = self.state.lock().unwrap();
        state.files.insert(file.path.clone(), file);
    }

    fn next_id(state: &mut RemoteState) -> FileId {
        state.next_id += 1;
        FileId::new(format!("id{}", state.next_id)).unwrap()
    }

    /// Adds an existing remote file and returns its metadata
    pub fn with_file(&self, path: &str, size: u64) -> RemoteFile {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let file = local_file(path, size).with_id(id);
        state.files.insert(file.path.clone(), file.clone());
        file
    }

    /// Adds an existing remote directory and returns its metadata
    pub fn with_dir(&self, path: &str) -> RemoteFile {
        let mut state = self.state.lock().unwrap();
        let id = Self::next_id(&mut state);
        let dir = RemoteFile::directory(path).with_id(id);
        state.files.insert(dir.path.clone(), dir.clone());
        dir
    }

    /// Makes every upsert of `path` fail
    pub fn fail_upsert(&self, path: &str) {
        self.state.lock().unwrap().failing.insert(path::normalize(path));
    }

    pub fn quirk(&self, path: &str, quirk: UpsertQuirk) {
        self.state
            .lock()
            .unwrap()
            .quirks
            .insert(path::normalize(path), quirk);
    }

    /// Makes lookups and upserts yield to the scheduler before running, so
    /// concurrent callers interleave
    pub fn yield_calls(&self) {
        self.state.lock().unwrap().yield_calls = true;
    }

    async fn maybe_yield(&self) {
        let yields = self.state.lock().unwrap().yield_calls;
        if yields {
            tokio::task::yield_now().await;
        }
    }

    pub fn set_quota(&self, used: u64, limit: u64) {
        self.state.lock().unwrap().quota = Some(Quota { used, limit });
    }

    /// Makes the quota query hang forever
    pub fn stall_quota(&self) {
        self.state.lock().unwrap().stall_quota = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// Paths of all upserts, in call order
    pub fn upserted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upsert { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn upsert_count(&self, path: &str) -> usize {
        self.upserted().iter().filter(|p| *p == path).count()
    }

    pub fn get(&self, path: &str) -> Option<RemoteFile> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub fn is_trashed(&self, id: &FileId) -> bool {
        self.state.lock().unwrap().trashed.contains(id)
    }

    /// Path of the remote object carrying `id`
    pub fn path_of(&self, id: &FileId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .values()
            .find(|f| f.id.as_ref() == Some(id))
            .map(|f| f.path.clone())
    }
}

#[async_trait::async_trait]
impl IRemoteStore for MockRemote {
    async fn find_by_path(&self, path: &str) -> anyhow::Result<Option<RemoteFile>> {
        self.maybe_yield().await;
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Find(path.to_string()));
        if state.broken_lookups.contains(path) {
            bail!("lookup of {path} unavailable");
        }
        Ok(state.files.get(path).cloned())
    }

    async fn upsert_by_comparison(
        &self,
        request: &UpsertRequest,
    ) -> anyhow::Result<Option<RemoteFile>> {
        self.maybe_yield().await;
        let mut state = self.state.lock().unwrap();
        let target = request.src.path.clone();
        state.calls.push(Call::Upsert {
            path: target.clone(),
            is_dir: request.src.is_dir,
        });

        if state.failing.contains(&target) {
            bail!("injected failure for {target}");
        }
        if let Some(quirk) = state.quirks.get(&target).copied() {
            match quirk {
                UpsertQuirk::FailAfterWrite | UpsertQuirk::UnchangedAfterWrite => {
                    let id = Self::next_id(&mut state);
                    let written = request.src.clone().with_id(id);
                    state.files.insert(target.clone(), written);
                    if quirk == UpsertQuirk::FailAfterWrite {
                        bail!("injected failure for {target}");
                    }
                    return Ok(None);
                }
                UpsertQuirk::UnchangedWithoutWrite => return Ok(None),
                UpsertQuirk::FailAndBreakLookup => {
                    state.broken_lookups.insert(target.clone());
                    bail!("injected failure for {target}");
                }
            }
        }
        let parent_known = state
            .files
            .values()
            .any(|f| f.id.as_ref() == Some(&request.parent_id));
        if !parent_known {
            bail!("parent {} does not exist", request.parent_id);
        }
        if request.src.is_dir && state.files.contains_key(&target) {
            bail!("{target} already exists");
        }
        if let Some(dest) = &request.dest {
            if !request.src.is_dir
                && dest.size == request.src.size
                && dest.checksum == request.src.checksum
            {
                return Ok(None);
            }
        }

        let id = match request.src.id.clone() {
            Some(id) => id,
            None => Self::next_id(&mut state),
        };
        let written = request.src.clone().with_id(id);
        state.files.insert(target, written.clone());
        Ok(Some(written))
    }

    async fn trash(&self, id: &FileId) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Trash(id.to_string()));
        let path = state
            .files
            .iter()
            .find(|(_, f)| f.id.as_ref() == Some(id))
            .map(|(p, _)| p.clone())
            .ok_or_else(|| anyhow!("no remote object {id}"))?;
        state.files.remove(&path);
        state.trashed.insert(id.clone());
        Ok(())
    }

    async fn untrash(&self, id: &FileId) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Untrash(id.to_string()));
        if !state.trashed.remove(id) {
            bail!("{id} is not in the trash");
        }
        Ok(())
    }

    async fn quota(&self) -> anyhow::Result<Quota> {
        let stall = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Quota);
            state.stall_quota
        };
        if stall {
            std::future::pending::<()>().await;
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .quota
            .unwrap_or(Quota { used: 0, limit: 0 }))
    }
}

// ============================================================================
// Index store
// ============================================================================

/// Memory index that notes how many remote calls preceded each write
pub struct RecordingIndex {
    inner: MemoryIndexStore,
    remote: Arc<MockRemote>,
    writes: Mutex<Vec<(FileId, usize)>>,
}

impl RecordingIndex {
    pub fn new(inner: MemoryIndexStore, remote: Arc<MockRemote>) -> Self {
        Self {
            inner,
            remote,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn get(&self, id: &FileId) -> Option<Index> {
        self.inner.get(id)
    }

    /// Written ids with the remote call count at the time of each write
    pub fn writes(&self) -> Vec<(FileId, usize)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IIndexStore for RecordingIndex {
    async fn serialize(&self, index: &Index) -> anyhow::Result<()> {
        let seen = self.remote.calls().len();
        self.writes.lock().unwrap().push((index.file_id.clone(), seen));
        self.inner.serialize(index).await
    }

    async fn deserialize(&self, id: &FileId) -> anyhow::Result<Option<Index>> {
        self.inner.deserialize(id).await
    }

    async fn remove(&self, id: &FileId) -> anyhow::Result<()> {
        self.inner.remove(id).await
    }
}

// ============================================================================
// Change resolver
// ============================================================================

/// Returns canned change lists per source path and mount name
#[derive(Default)]
pub struct ScriptedResolver {
    sources: HashMap<String, Vec<Change>>,
    mounts: HashMap<String, Vec<Change>>,
    failing: HashSet<String>,
    seen_local: Mutex<Vec<PathBuf>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, path: &str, changes: Vec<Change>) -> Self {
        self.sources.insert(path.to_string(), changes);
        self
    }

    pub fn mount(mut self, remote_path: &str, changes: Vec<Change>) -> Self {
        self.mounts.insert(remote_path.to_string(), changes);
        self
    }

    pub fn failing(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    /// Local paths the resolver was asked about
    pub fn seen_local(&self) -> Vec<PathBuf> {
        self.seen_local.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IChangeResolver for ScriptedResolver {
    async fn diff_change_list(
        &self,
        source_path: &str,
        local_abs_path: &Path,
        is_push: bool,
    ) -> anyhow::Result<Vec<Change>> {
        assert!(is_push);
        self.seen_local
            .lock()
            .unwrap()
            .push(local_abs_path.to_path_buf());
        if self.failing.contains(source_path) {
            bail!("cannot read {source_path}");
        }
        Ok(self.sources.get(source_path).cloned().unwrap_or_default())
    }

    async fn resolve_single(
        &self,
        remote_path: &str,
        local_path: &Path,
    ) -> anyhow::Result<Vec<Change>> {
        self.seen_local.lock().unwrap().push(local_path.to_path_buf());
        if self.failing.contains(remote_path) {
            bail!("cannot stat {}", local_path.display());
        }
        Ok(self.mounts.get(remote_path).cloned().unwrap_or_default())
    }
}

// ============================================================================
// Prompter and mount registry
// ============================================================================

/// Fixed answers; remembers which questions were asked
pub struct ScriptedPrompter {
    pub conflicts: bool,
    pub changes: bool,
    pub quota: bool,
    asked: Mutex<Vec<&'static str>>,
}

impl ScriptedPrompter {
    pub fn answering(conflicts: bool, changes: bool, quota: bool) -> Self {
        Self {
            conflicts,
            changes,
            quota,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn yes() -> Self {
        Self::answering(true, true, true)
    }

    pub fn asked(&self) -> Vec<&'static str> {
        self.asked.lock().unwrap().clone()
    }
}

impl IPrompter for ScriptedPrompter {
    fn confirm_conflicts(&self, _unresolved: &[Change]) -> bool {
        self.asked.lock().unwrap().push("conflicts");
        self.conflicts
    }

    fn confirm_changes(&self, _changes: &[Change]) -> bool {
        self.asked.lock().unwrap().push("changes");
        self.changes
    }

    fn confirm_quota(&self, _status: QuotaStatus, _projected_bytes: u64) -> bool {
        self.asked.lock().unwrap().push("quota");
        self.quota
    }
}

#[derive(Default)]
pub struct RecordingMounts {
    cleared: Mutex<Vec<Vec<MountPoint>>>,
}

impl RecordingMounts {
    pub fn cleared(&self) -> Vec<Vec<MountPoint>> {
        self.cleared.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl IMountRegistry for RecordingMounts {
    async fn clear(&self, points: &[MountPoint]) -> anyhow::Result<()> {
        self.cleared.lock().unwrap().push(points.to_vec());
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct Harness {
    pub remote: Arc<MockRemote>,
    pub index: Arc<RecordingIndex>,
    pub resolver: Arc<ScriptedResolver>,
    pub prompter: Arc<ScriptedPrompter>,
    pub mounts: Arc<RecordingMounts>,
    pub pusher: Pusher,
}

pub fn sync_root() -> PathBuf {
    PathBuf::from("/home/user/Drive")
}

impl Harness {
    pub fn new(
        remote: MockRemote,
        index: MemoryIndexStore,
        resolver: ScriptedResolver,
        prompter: ScriptedPrompter,
    ) -> Self {
        let config = Config {
            sync_root: sync_root(),
            ..Config::default()
        };
        let remote = Arc::new(remote);
        let index = Arc::new(RecordingIndex::new(index, remote.clone()));
        let resolver = Arc::new(resolver);
        let prompter = Arc::new(prompter);
        let mounts = Arc::new(RecordingMounts::default());
        let pusher = Pusher::new(
            &config,
            remote.clone(),
            index.clone(),
            resolver.clone(),
            prompter.clone(),
            mounts.clone(),
        );
        Self {
            remote,
            index,
            resolver,
            prompter,
            mounts,
            pusher,
        }
    }
}
