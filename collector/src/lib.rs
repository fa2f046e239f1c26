use futures::StreamExt;
use harvest_core::{
    CollectionResult, CommunitySource, CoreError, ErrorExt, HarvestFault, PacingPolicy,
    PostRecord, StopReason, SAFETY_CAP,
};
use tracing::{info, warn};

/// Drains a community's newest posts into flat records.
///
/// Faults never escape [`Collector::collect`]: a failed connectivity probe
/// yields an empty result, a failure mid-stream yields what was gathered so far.
pub struct Collector<S> {
    source: S,
    pacing: PacingPolicy,
}

impl<S: CommunitySource> Collector<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pacing: PacingPolicy::default(),
        }
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn collect(&self, community: &str, limit: Option<usize>) -> CollectionResult {
        info!("Connecting to r/{}", community);
        match self.source.subscriber_count(community).await {
            Ok(subscribers) => {
                info!("Connected to r/{} ({} subscribers)", community, subscribers);
            }
            Err(source) => {
                let fault = HarvestFault::Connectivity {
                    community: community.to_string(),
                    source,
                };
                fault.log_error();
                return CollectionResult::empty(StopReason::Fault(fault));
            }
        }

        let cap = limit.map_or(SAFETY_CAP, |limit| limit.min(SAFETY_CAP));
        if cap == 0 {
            return CollectionResult::empty(StopReason::LimitReached);
        }

        info!("Collecting up to {} posts from r/{}", cap, community);
        let mut records = Vec::new();
        let mut pauses = 0;
        let mut posts = self.source.newest_posts(community, Some(cap));

        let stop = loop {
            let post = match posts.next().await {
                Some(Ok(post)) => post,
                Some(Err(e)) => break interrupted(records.len(), e),
                None => break StopReason::Exhausted,
            };

            match PostRecord::try_from(post) {
                Ok(record) => records.push(record),
                Err(e) => break interrupted(records.len(), e),
            }

            let collected = records.len();
            if collected >= SAFETY_CAP {
                warn!("Reached safety limit of {} posts", SAFETY_CAP);
                break StopReason::SafetyCap;
            }
            if collected >= cap {
                info!("Reached requested limit of {} posts", cap);
                break StopReason::LimitReached;
            }
            if self.pacing.is_checkpoint(collected) {
                info!("Collected {} posts...", collected);
                tokio::time::sleep(self.pacing.pause).await;
                pauses += 1;
            }
        };

        info!("Finished! Collected {} total posts", records.len());
        CollectionResult {
            records,
            pauses,
            stop,
        }
    }
}

fn interrupted(collected: usize, source: CoreError) -> StopReason {
    let fault = HarvestFault::Collection { collected, source };
    fault.log_warn();
    warn!("Collected {} posts before error", collected);
    StopReason::Fault(fault)
}
