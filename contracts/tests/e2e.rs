//! End-to-end bindings against the simulated deployments.
//!
//! Each test builds a fresh chain, registers a parent name for Alice, and
//! drives a `NameBinder` through the public API. Post-state is read back
//! from the chain, and idempotency is checked by counting mutating calls.

use std::sync::Arc;

use alloy_primitives::Address;

use ensbind_contracts::{Method, SimulatedChain};
use ensbind_protocol::config::evm_coin_type;
use ensbind_protocol::directory::{ChainDirectory, ChainFamily, NetworkId};
use ensbind_protocol::services::ServiceError;
use ensbind_protocol::{BindError, BindStage, NameBinder, WriteOutcome};

const ALICE: Address = Address::repeat_byte(0xaa);
const BOB: Address = Address::repeat_byte(0xbb);
const MALLORY: Address = Address::repeat_byte(0x66);
/// The deployed contract being named. Alice is its `Ownable` owner.
const APP: Address = Address::repeat_byte(0xc0);

const PARENT: &str = "domain.eth";
const NAME: &str = "app.domain.eth";

struct Fixture {
    chain: SimulatedChain,
    directory: Arc<ChainDirectory>,
}

impl Fixture {
    fn new(network: NetworkId) -> Self {
        let directory = Arc::new(ChainDirectory::builtin());
        let chain = SimulatedChain::from_directory(&directory);
        chain.register(network, PARENT, ALICE);
        chain.set_contract_owner(network, APP, ALICE);
        Self { chain, directory }
    }

    fn binder(&self, caller: Address) -> NameBinder {
        NameBinder::new(Arc::clone(&self.directory), self.chain.connect(caller))
    }

    fn public_resolver(&self, network: NetworkId) -> Address {
        self.directory
            .services_for(network)
            .public_resolver
            .unwrap()
    }
}

// ---------------------------------------------------------------------------
// L1
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mainnet_bind_sets_subname_forward_and_reverse() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);

    let report = fx.binder(ALICE).bind_name(net, APP, NAME).await.unwrap();

    assert_eq!(report.stage, BindStage::ReverseSet);
    assert_eq!(report.family, ChainFamily::L1);
    assert_eq!(report.subname, Some(WriteOutcome::Written));
    assert_eq!(report.forward, Some(WriteOutcome::Written));
    assert_eq!(report.reverse, Some(WriteOutcome::Written));
    assert_eq!(report.alias, None);
    assert_eq!(report.writes(), 3);

    assert_eq!(fx.chain.owner(net, NAME), ALICE);
    assert_eq!(fx.chain.resolver_of(net, NAME), fx.public_resolver(net));
    assert_eq!(fx.chain.addr(net, NAME, 60), Some(APP.to_vec()));
    assert_eq!(fx.chain.reverse_name(net, APP).as_deref(), Some(NAME));
    assert_eq!(fx.chain.reverse_owner(net, APP), ALICE);
    assert_eq!(fx.chain.mutating_calls(), 3);
}

#[tokio::test]
async fn writes_land_in_stage_order() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);

    fx.binder(ALICE).bind_name(net, APP, NAME).await.unwrap();

    let writes: Vec<Method> = fx
        .chain
        .calls()
        .into_iter()
        .filter(|call| call.method.is_mutating())
        .map(|call| {
            assert!(call.ok);
            assert_eq!(call.network, net);
            assert_eq!(call.caller, ALICE);
            call.method
        })
        .collect();
    assert_eq!(
        writes,
        vec![
            Method::RegistrySetSubnodeRecord,
            Method::ResolverSetAddr,
            Method::ReverseSetNameForAddr,
        ]
    );
}

#[tokio::test]
async fn caller_binding_its_own_address_gets_primary_name() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);

    fx.binder(ALICE).bind_name(net, ALICE, NAME).await.unwrap();

    assert_eq!(fx.chain.owner(net, NAME), ALICE);
    assert_eq!(fx.chain.addr(net, NAME, 60), Some(ALICE.to_vec()));
    assert_eq!(fx.chain.reverse_name(net, ALICE).as_deref(), Some(NAME));
}

#[tokio::test]
async fn second_bind_makes_no_writes() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    let binder = fx.binder(ALICE);

    binder.bind_name(net, APP, NAME).await.unwrap();
    let before = fx.chain.mutating_calls();

    let again = binder.bind_name(net, APP, NAME).await.unwrap();
    assert!(again.is_noop());
    assert_eq!(again.writes(), 0);
    assert_eq!(fx.chain.mutating_calls(), before);
}

#[tokio::test]
async fn subname_owned_by_someone_else_is_left_alone() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    fx.chain.register(net, NAME, BOB);

    let err = fx.binder(ALICE).bind_name(net, APP, NAME).await.unwrap_err();

    assert!(matches!(err, BindError::NodeOwnedByOther { owner, .. } if owner == BOB));
    assert_eq!(err.stage(), BindStage::SubnameReady);
    assert_eq!(fx.chain.owner(net, NAME), BOB);
    assert_eq!(fx.chain.mutating_calls(), 0);
}

#[tokio::test]
async fn caller_without_parent_is_rejected_before_any_write() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);

    let err = fx
        .binder(MALLORY)
        .bind_name(net, APP, NAME)
        .await
        .unwrap_err();

    assert!(matches!(err, BindError::NotAuthorized { caller, .. } if caller == MALLORY));
    assert_eq!(fx.chain.mutating_calls(), 0);
    assert!(fx.chain.owner(net, NAME).is_zero());
}

#[tokio::test]
async fn failed_owner_read_denies_authorization() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    fx.chain.fail_once(net, Method::RegistryOwner);

    let err = fx.binder(ALICE).bind_name(net, APP, NAME).await.unwrap_err();

    assert!(matches!(err, BindError::NotAuthorized { .. }));
    assert_eq!(fx.chain.mutating_calls(), 0);
}

#[tokio::test]
async fn structural_errors_make_no_remote_calls() {
    let fx = Fixture::new(NetworkId::MAINNET);
    let binder = fx.binder(ALICE);

    let err = binder
        .bind_name(NetworkId(999_999), APP, NAME)
        .await
        .unwrap_err();
    assert_eq!(err, BindError::UnsupportedNetwork(NetworkId(999_999)));

    let err = binder
        .bind_name(NetworkId::MAINNET, APP, "eth")
        .await
        .unwrap_err();
    assert!(matches!(err, BindError::InvalidNameFormat(_)));
    assert_eq!(err.stage(), BindStage::Parsed);

    let err = binder
        .bind_name(NetworkId::MAINNET, Address::ZERO, NAME)
        .await
        .unwrap_err();
    assert_eq!(err, BindError::InvalidTarget);

    assert_eq!(fx.chain.total_calls(), 0);
}

#[tokio::test]
async fn wrapped_parent_creates_wrapped_subname() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    fx.chain.wrap(net, PARENT);
    let binder = fx.binder(ALICE);

    let report = binder.bind_name(net, APP, NAME).await.unwrap();

    assert_eq!(report.subname, Some(WriteOutcome::Written));
    assert!(fx.chain.is_wrapped(net, NAME));
    assert_eq!(fx.chain.owner(net, NAME), ALICE);
    assert_eq!(fx.chain.count(Method::WrapperSetSubnodeRecord), 1);
    assert_eq!(fx.chain.count(Method::RegistrySetSubnodeRecord), 0);
    assert_eq!(fx.chain.addr(net, NAME, 60), Some(APP.to_vec()));

    let again = binder.bind_name(net, APP, NAME).await.unwrap();
    assert!(again.is_noop());
}

#[tokio::test]
async fn wrapper_outage_falls_back_to_registry() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    fx.chain.fail_always(
        net,
        Method::WrapperIsWrapped,
        ServiceError::Transport("wrapper rpc down".into()),
    );

    let report = fx.binder(ALICE).bind_name(net, APP, NAME).await.unwrap();

    assert_eq!(report.stage, BindStage::ReverseSet);
    assert_eq!(fx.chain.count(Method::RegistrySetSubnodeRecord), 1);
    assert_eq!(fx.chain.owner(net, NAME), ALICE);
}

#[tokio::test]
async fn parent_without_resolver_uses_public_resolver() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    fx.chain.set_resolver(net, PARENT, Address::ZERO);

    fx.binder(ALICE).bind_name(net, APP, NAME).await.unwrap();

    assert_eq!(fx.chain.resolver_of(net, NAME), fx.public_resolver(net));
    assert_eq!(fx.chain.addr(net, NAME, 60), Some(APP.to_vec()));
}

#[tokio::test]
async fn parent_with_custom_resolver_passes_it_down() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    let custom = Address::repeat_byte(0x42);
    fx.chain.deploy_resolver(net, custom);
    fx.chain.set_resolver(net, PARENT, custom);

    fx.binder(ALICE).bind_name(net, APP, NAME).await.unwrap();

    assert_eq!(fx.chain.resolver_of(net, NAME), custom);
    assert_eq!(fx.chain.addr(net, NAME, 60), Some(APP.to_vec()));
}

// ---------------------------------------------------------------------------
// Failure and retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_subname_creation_stops_before_forward() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    fx.chain.fail_once(net, Method::RegistrySetSubnodeRecord);
    let binder = fx.binder(ALICE);

    let err = binder.bind_name(net, APP, NAME).await.unwrap_err();
    assert!(matches!(err, BindError::SubnameCreationFailed { .. }));
    assert_eq!(err.stage(), BindStage::SubnameReady);
    assert_eq!(fx.chain.count(Method::ResolverSetAddr), 0);

    let report = binder.bind_name(net, APP, NAME).await.unwrap();
    assert_eq!(report.subname, Some(WriteOutcome::Written));
    assert_eq!(report.stage, BindStage::ReverseSet);
}

#[tokio::test]
async fn failed_forward_write_keeps_subname_and_retry_converges() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    fx.chain.fail_once(net, Method::ResolverSetAddr);
    let binder = fx.binder(ALICE);

    let err = binder.bind_name(net, APP, NAME).await.unwrap_err();
    assert!(matches!(err, BindError::ForwardResolutionFailed { .. }));
    assert_eq!(err.stage(), BindStage::ForwardSet);
    // no rollback
    assert_eq!(fx.chain.owner(net, NAME), ALICE);
    assert_eq!(fx.chain.addr(net, NAME, 60), None);
    assert_eq!(fx.chain.count(Method::ReverseSetNameForAddr), 0);

    let report = binder.bind_name(net, APP, NAME).await.unwrap();
    assert_eq!(report.subname, Some(WriteOutcome::Unchanged));
    assert_eq!(report.forward, Some(WriteOutcome::Written));
    assert_eq!(report.reverse, Some(WriteOutcome::Written));
    assert_eq!(fx.chain.addr(net, NAME, 60), Some(APP.to_vec()));
}

#[tokio::test]
async fn failed_reverse_write_is_a_hard_failure() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    fx.chain.fail_once(net, Method::ReverseSetNameForAddr);
    let binder = fx.binder(ALICE);

    let err = binder.bind_name(net, APP, NAME).await.unwrap_err();
    assert!(matches!(err, BindError::ReverseResolutionFailed { .. }));
    assert_eq!(err.stage(), BindStage::ReverseSet);
    assert!(err.is_retryable());
    assert_eq!(fx.chain.addr(net, NAME, 60), Some(APP.to_vec()));
    assert!(fx.chain.reverse_name(net, APP).is_none());

    let before = fx.chain.mutating_calls();
    let report = binder.bind_name(net, APP, NAME).await.unwrap();
    assert_eq!(report.writes(), 1);
    assert_eq!(fx.chain.mutating_calls(), before + 1);
    assert_eq!(fx.chain.reverse_name(net, APP).as_deref(), Some(NAME));
}

#[tokio::test]
async fn missing_resolver_everywhere_stops_at_forward_stage() {
    let net = NetworkId(31337);
    let mut directory = ChainDirectory::builtin();
    let mut services = directory.services_for(NetworkId::MAINNET);
    services.public_resolver = None;
    directory.insert(net, services);
    let directory = Arc::new(directory);
    let chain = SimulatedChain::from_directory(&directory);
    chain.register(net, PARENT, ALICE);
    chain.set_resolver(net, PARENT, Address::ZERO);

    let binder = NameBinder::new(Arc::clone(&directory), chain.connect(ALICE));
    let err = binder.bind_name(net, APP, NAME).await.unwrap_err();

    assert_eq!(
        err,
        BindError::ResolverUnavailable {
            name: NAME.to_string()
        }
    );
    assert_eq!(err.stage(), BindStage::ForwardSet);
    // no rollback
    assert_eq!(chain.owner(net, NAME), ALICE);
    assert_eq!(chain.count(Method::RegistrySetSubnodeRecord), 1);
    assert_eq!(chain.count(Method::ResolverSetAddr), 0);
    assert_eq!(chain.mutating_calls(), 1);
}

#[tokio::test]
async fn reverse_claim_for_foreign_target_fails_softly() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    // Alice owns the name but neither is nor owns BOB.
    let err = fx.binder(ALICE).bind_name(net, BOB, NAME).await.unwrap_err();

    assert!(matches!(err, BindError::ReverseResolutionFailed { .. }));
    assert_eq!(fx.chain.addr(net, NAME, 60), Some(BOB.to_vec()));

    // Forward-only binding of the same target succeeds untouched.
    let report = fx
        .binder(ALICE)
        .bind_forward_only(net, BOB, NAME)
        .await
        .unwrap();
    assert!(report.is_noop());
}

// ---------------------------------------------------------------------------
// Forward-only, dry runs, lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn forward_only_skips_reverse() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);

    let report = fx
        .binder(ALICE)
        .bind_forward_only(net, APP, NAME)
        .await
        .unwrap();

    assert_eq!(report.stage, BindStage::ForwardSet);
    assert_eq!(report.reverse, None);
    assert_eq!(fx.chain.count(Method::ReverseSetNameForAddr), 0);
    assert!(fx.chain.reverse_name(net, APP).is_none());
}

#[tokio::test]
async fn plan_reports_pending_writes_without_writing() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    let binder = fx.binder(ALICE);

    let plan = binder.plan(net, APP, NAME, false).await.unwrap();
    assert!(plan.dry_run);
    assert_eq!(plan.pending_writes(), 3);
    assert_eq!(plan.writes(), 0);
    assert_eq!(fx.chain.mutating_calls(), 0);
    assert!(fx.chain.owner(net, NAME).is_zero());

    binder.bind_name(net, APP, NAME).await.unwrap();
    let plan = binder.plan(net, APP, NAME, false).await.unwrap();
    assert_eq!(plan.pending_writes(), 0);
    assert!(plan.is_noop());
}

#[tokio::test]
async fn plan_surfaces_structural_errors() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    fx.chain.register(net, NAME, BOB);

    let err = fx
        .binder(ALICE)
        .plan(net, APP, NAME, true)
        .await
        .unwrap_err();
    assert!(matches!(err, BindError::NodeOwnedByOther { .. }));
}

#[tokio::test]
async fn lookups_read_back_the_binding() {
    let net = NetworkId::MAINNET;
    let fx = Fixture::new(net);
    let binder = fx.binder(ALICE);

    assert_eq!(binder.resolve_forward(net, NAME).await.unwrap(), None);
    assert_eq!(binder.primary_name(net, APP).await.unwrap(), None);

    binder.bind_name(net, APP, NAME).await.unwrap();

    assert_eq!(binder.resolve_forward(net, NAME).await.unwrap(), Some(APP));
    assert_eq!(
        binder.primary_name(net, APP).await.unwrap().as_deref(),
        Some(NAME)
    );
}

// ---------------------------------------------------------------------------
// L2 and Base
// ---------------------------------------------------------------------------

#[tokio::test]
async fn linea_bind_uses_ensip11_coin_type_and_l2_reverse() {
    let net = NetworkId::LINEA;
    let fx = Fixture::new(net);
    let binder = fx.binder(ALICE);

    let report = binder.bind_name(net, APP, NAME).await.unwrap();

    assert_eq!(report.family, ChainFamily::L2);
    assert_eq!(report.writes(), 3);
    let coin_type = evm_coin_type(net.chain_id());
    assert_eq!(fx.chain.addr(net, NAME, coin_type), Some(APP.to_vec()));
    assert_eq!(fx.chain.addr(net, NAME, 60), None);
    assert_eq!(fx.chain.l2_name(net, APP).as_deref(), Some(NAME));
    assert_eq!(fx.chain.count(Method::L2SetNameForAddr), 1);
    assert_eq!(fx.chain.count(Method::ReverseSetNameForAddr), 0);

    assert_eq!(
        binder.primary_name(net, APP).await.unwrap().as_deref(),
        Some(NAME)
    );
    assert!(binder.bind_name(net, APP, NAME).await.unwrap().is_noop());
}

#[tokio::test]
async fn base_bind_writes_primary_name_and_alias() {
    let net = NetworkId::BASE;
    let fx = Fixture::new(net);
    let binder = fx.binder(ALICE);

    let report = binder.bind_name(net, APP, NAME).await.unwrap();

    assert_eq!(report.family, ChainFamily::Base);
    assert_eq!(report.reverse, Some(WriteOutcome::Written));
    assert_eq!(report.alias, Some(WriteOutcome::Written));
    assert_eq!(report.writes(), 4);
    assert_eq!(fx.chain.addr(net, NAME, 60), Some(APP.to_vec()));
    assert_eq!(fx.chain.reverse_name(net, APP).as_deref(), Some(NAME));
    assert_eq!(
        fx.chain.reverse_text(net, APP, "basename").as_deref(),
        Some(NAME)
    );

    let before = fx.chain.mutating_calls();
    let again = binder.bind_name(net, APP, NAME).await.unwrap();
    assert_eq!(again.alias, Some(WriteOutcome::Unchanged));
    assert_eq!(fx.chain.mutating_calls(), before);
}

#[tokio::test]
async fn base_forward_only_writes_no_alias() {
    let net = NetworkId::BASE;
    let fx = Fixture::new(net);

    let report = fx
        .binder(ALICE)
        .bind_forward_only(net, APP, NAME)
        .await
        .unwrap();

    assert_eq!(report.alias, None);
    assert_eq!(report.writes(), 2);
    assert!(fx.chain.reverse_text(net, APP, "basename").is_none());
    assert_eq!(fx.chain.count(Method::ResolverSetText), 0);
}

#[tokio::test]
async fn base_alias_failure_fails_the_reverse_stage() {
    let net = NetworkId::BASE;
    let fx = Fixture::new(net);
    fx.chain.fail_once(net, Method::ResolverSetText);
    let binder = fx.binder(ALICE);

    let err = binder.bind_name(net, APP, NAME).await.unwrap_err();
    assert!(matches!(err, BindError::ReverseResolutionFailed { .. }));
    assert_eq!(fx.chain.reverse_name(net, APP).as_deref(), Some(NAME));

    let report = binder.bind_name(net, APP, NAME).await.unwrap();
    assert_eq!(report.reverse, Some(WriteOutcome::Unchanged));
    assert_eq!(report.alias, Some(WriteOutcome::Written));
}

#[tokio::test]
async fn base_alias_node_lookup_failure_fails_the_reverse_stage() {
    let net = NetworkId::BASE;
    let fx = Fixture::new(net);
    // The first lookup is the primary-name read, which fails open; the
    // second is the alias lookup.
    fx.chain.fail_times(
        net,
        Method::ReverseNode,
        2,
        ServiceError::Transport("reverse registrar rpc down".into()),
    );
    let binder = fx.binder(ALICE);

    let err = binder.bind_name(net, APP, NAME).await.unwrap_err();
    assert!(matches!(err, BindError::ReverseResolutionFailed { .. }));
    assert_eq!(err.stage(), BindStage::ReverseSet);
    assert_eq!(fx.chain.reverse_name(net, APP).as_deref(), Some(NAME));
    assert!(fx.chain.reverse_text(net, APP, "basename").is_none());
    assert_eq!(fx.chain.count(Method::ResolverSetText), 0);

    let report = binder.bind_name(net, APP, NAME).await.unwrap();
    assert_eq!(report.reverse, Some(WriteOutcome::Unchanged));
    assert_eq!(report.alias, Some(WriteOutcome::Written));
}

#[tokio::test]
async fn directory_override_enables_new_network() {
    let net = NetworkId(31337);
    let mut directory = ChainDirectory::builtin();
    directory.insert(net, directory.services_for(NetworkId::MAINNET));
    let directory = Arc::new(directory);
    let chain = SimulatedChain::from_directory(&directory);
    chain.register(net, PARENT, ALICE);
    chain.set_contract_owner(net, APP, ALICE);

    let binder = NameBinder::new(Arc::clone(&directory), chain.connect(ALICE));
    let report = binder.bind_name(net, APP, NAME).await.unwrap();

    // Unknown chain ids bind with the L1 strategy.
    assert_eq!(report.family, ChainFamily::L1);
    assert_eq!(report.stage, BindStage::ReverseSet);
    assert_eq!(chain.reverse_name(net, APP).as_deref(), Some(NAME));
}
