use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, trace, warn};

use crate::assembler::assemble;
use crate::config::{ControlSettings, TreeConfig};
use crate::error::{Error, Result};
use crate::navigate::Navigator;
use crate::node::TreeSnapshot;
use crate::record::{Record, RecordRef};
use crate::render::{RenderOptions, TreeEvent, TreeRenderer};
use crate::resolver::resolve_root;
use crate::selection::{Debouncer, SelectionChange, SelectionController};
use crate::store::{ascending_order, equals_filter, RecordStore};

/// Orchestrates one control activation: root resolution, assembly, the render
/// handoff, and the selection/navigation event loop.
///
/// Everything runs on one task; ordering between the pipeline stages is enforced
/// by awaiting, not by locks. Dropping an in-flight `activate` future is the
/// cancellation path for fetches and ready-polling.
pub struct TreeGridControl<S, R, N>
where
    S: RecordStore,
    R: TreeRenderer,
    N: Navigator,
{
    config: TreeConfig,
    store: S,
    renderer: R,
    navigator: N,
    controller: SelectionController,
    debounce: Debouncer,
    snapshot: Option<TreeSnapshot>,
    active: bool,
}

impl<S, R, N> TreeGridControl<S, R, N>
where
    S: RecordStore,
    R: TreeRenderer,
    N: Navigator,
{
    /// Resolve configuration once and wire the collaborators together.
    pub fn new(settings: &ControlSettings, store: S, renderer: R, navigator: N) -> Result<Self> {
        let config = TreeConfig::resolve(settings)?;
        let debounce = Debouncer::new(config.debounce_delay);
        Ok(Self {
            config,
            store,
            renderer,
            navigator,
            controller: SelectionController::new(),
            debounce,
            snapshot: None,
            active: false,
        })
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn snapshot(&self) -> Option<&TreeSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn selected(&self) -> Option<&str> {
        self.controller.selected()
    }

    /// Build the tree for the record in context and hand it to the rendering
    /// collaborator. Terminal failures are logged and leave the tree unbuilt;
    /// nothing is surfaced to the collaborator.
    pub async fn activate(&mut self, start: &RecordRef) -> Result<()> {
        if self.active {
            // Only one tree build per activation; rebuilds need a deactivate first.
            return Err(Error::BuildInProgress);
        }
        self.active = true;
        match self.build(start).await {
            Ok(()) => {
                info!(
                    entity = %self.config.entity_name,
                    nodes = self.snapshot.as_ref().map(TreeSnapshot::len).unwrap_or(0),
                    "tree activated"
                );
                Ok(())
            }
            Err(err) => {
                error!(%err, "tree build failed, leaving tree unbuilt");
                self.deactivate();
                Err(err)
            }
        }
    }

    /// Idempotent re-render: hand the existing snapshot to the collaborator again.
    /// A no-op when no snapshot has been built.
    pub async fn refresh(&mut self) -> Result<()> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Ok(());
        };
        let options = RenderOptions::for_config(&self.config);
        self.renderer.initialize(snapshot, &options).await
    }

    /// Process collaborator events until the event channel closes or the shutdown
    /// signal fires, then tear down. A pending debounce follow-up is drained when
    /// the channel closes normally and dropped on shutdown.
    pub async fn run_events(
        &mut self,
        events: &mut mpsc::UnboundedReceiver<TreeEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) {
        loop {
            let deadline = self.debounce.deadline();
            tokio::select! {
                maybe_event = events.recv() => match maybe_event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        self.drain_pending().await;
                        break;
                    }
                },
                () = sleep_until_deadline(deadline), if deadline.is_some() => {
                    self.fire_navigation().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("shutdown requested, tearing down event loop");
                        break;
                    }
                }
            }
        }
        self.deactivate();
    }

    /// Feed one collaborator event through the selection controller. Accepted
    /// changes are echoed back to the widget and (re)arm the navigation debounce.
    pub async fn handle_event(&mut self, event: TreeEvent) {
        if !self.active {
            // Late callback after teardown must not touch torn-down state.
            trace!("dropping event received after deactivation");
            return;
        }
        let Some(snapshot) = self.snapshot.as_ref() else {
            trace!("dropping event before a snapshot exists");
            return;
        };
        match self.controller.on_event(&event, snapshot) {
            SelectionChange::Selected(id) => {
                if let Err(err) = self.renderer.apply_selection(Some(&id)).await {
                    warn!(%err, %id, "could not re-apply selection on widget");
                }
                self.debounce.arm(Some(id));
            }
            SelectionChange::Deselected => {
                if let Err(err) = self.renderer.apply_selection(None).await {
                    warn!(%err, "could not clear selection on widget");
                }
                self.debounce.arm(None);
            }
            SelectionChange::Ignored => {}
        }
    }

    /// Cancel pending timers and discard the snapshot. In-flight remote fetches
    /// are not aborted; cleanup is best-effort.
    pub fn deactivate(&mut self) {
        self.debounce.cancel();
        self.snapshot = None;
        self.controller.reset();
        self.active = false;
    }

    async fn build(&mut self, start: &RecordRef) -> Result<()> {
        let root = resolve_root(&self.store, &self.config, start).await?;
        let descendants = self.fetch_descendants(&root).await?;
        let snapshot = assemble(&root, &descendants, &self.config)?;
        self.render(snapshot).await
    }

    async fn fetch_descendants(&self, root: &Record) -> Result<Vec<Record>> {
        let Some(root_attribute) = self.config.root_attribute.as_deref() else {
            // No root mapping means no descendant filter can be expressed.
            return Ok(Vec::new());
        };
        let root_id = root
            .text(&self.config.id_attribute)
            .ok_or_else(|| Error::MissingAttribute(self.config.id_attribute.clone()))?;

        let filter = equals_filter(root_attribute, root_id);
        let order = ascending_order(&self.config.label_attribute);
        debug!(%filter, cap = self.config.page_cap, "fetching descendant batch");
        self.store
            .retrieve_many(&self.config.entity_name, &filter, &order, self.config.page_cap)
            .await
    }

    async fn render(&mut self, snapshot: TreeSnapshot) -> Result<()> {
        self.controller.begin_render();
        let mut attempts = 0;
        while !self.renderer.is_ready() {
            attempts += 1;
            if attempts >= self.config.poll_attempts {
                return Err(Error::RenderingNotReady { attempts });
            }
            trace!(attempts, "rendering collaborator not ready, retrying");
            sleep(self.config.poll_interval).await;
        }

        let options = RenderOptions::for_config(&self.config);
        self.renderer.initialize(&snapshot, &options).await?;
        self.snapshot = Some(snapshot);
        self.controller.widget_ready();
        Ok(())
    }

    async fn fire_navigation(&mut self) {
        let Some(target) = self.debounce.take_due(Instant::now()) else {
            return;
        };
        // Only a direct selection navigates; a coalesced deselection just settles.
        let Some(id) = target else {
            return;
        };
        match self.navigator.open_record(&self.config.entity_name, &id).await {
            Ok(()) => info!(%id, "opened record"),
            Err(err) => error!(%err, %id, "failed to open record"),
        }
    }

    async fn drain_pending(&mut self) {
        if let Some(deadline) = self.debounce.deadline() {
            sleep_until(deadline).await;
            self.fire_navigation().await;
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
