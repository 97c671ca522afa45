//! In-memory chain and fee endpoint used by the unit tests.
//!
//! [`SimulatedChain`] executes just enough of the Safe, Safe proxy factory, module
//! proxy factory, Roles and yield-proxy factory contracts to drive a full onboarding:
//! strict account nonces, CREATE2 addresses, creation events, EIP-712 Safe digests,
//! owner signature checks and Roles ownership. Knobs inject the failures the
//! pipeline has to handle.

use alloy_primitives::{
    bytes, hex, keccak256, Address, Bytes, FixedBytes, Keccak256, Log, LogData, Signature, TxHash, B256, U256,
};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{eip712_domain, sol, SolCall, SolEvent, SolStruct, SolValue};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::chain::{ChainContext, ChainError, ChainReader, ChainWriter, TxReceipt, TxRequest};
use crate::constants::{MODULE_PROXY_FACTORY_ADDRESS, SAFE_PROXY_FACTORY_ADDRESS, SAFE_SINGLETON_ADDRESS};
use crate::contracts::{
    IModuleProxyFactory, IRoles, ISafe, ISafeProxyFactory, ISafeProxyFactoryV130, ISafeProxyFactoryV141,
    IYieldProxyFactory,
};
use crate::fees::FeeConfig;
use crate::safe::Operation;
use crate::signer::signature_to_bytes;

const CHAIN_ID: u64 = 31_337;

/// Stand-in for the Safe factory's `proxyCreationCode`
const PROXY_CREATION_CODE: &[u8] = &hex!("608060405234801561001057600080fd5b506040516101e63803806101e6833981");

sol! {
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }
}

/// How a factory reports a deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreationEvent {
    /// Current event layout
    #[default]
    Standard,
    /// Safe v1.3.0 `ProxyCreation` with no indexed fields
    SafeV130,
    /// No creation event at all
    Suppressed,
    /// An event naming an address other than the one actually created
    WrongAddress,
}

/// A Roles call as observed by the simulated module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRoleCall {
    ScopeTarget(Address),
    AllowFunction(Address, FixedBytes<4>, u8),
    AssignRoles(Address),
    SetDefaultRole(Address),
}

#[derive(Debug, Default)]
struct SafeAccount {
    owners: Vec<Address>,
    nonce: U256,
    modules: HashSet<Address>,
}

#[derive(Debug)]
struct RolesAccount {
    owner: Address,
    calls: Vec<RecordedRoleCall>,
}

#[derive(Debug, Default)]
struct State {
    next_nonce: u64,
    sent: Vec<(u64, TxHash)>,
    receipts: HashMap<TxHash, TxReceipt>,
    safes: HashMap<Address, SafeAccount>,
    roles: HashMap<Address, RolesAccount>,
    safe_event: CreationEvent,
    module_event: CreationEvent,
    reverting: HashSet<Address>,
    fail_sends_after: Option<usize>,
    yield_reads: usize,
}

/// Shared handle to one simulated network with one signing account
#[derive(Debug, Clone)]
pub struct SimulatedChain {
    signer: PrivateKeySigner,
    state: Arc<Mutex<State>>,
}

impl Default for SimulatedChain {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChain {
    pub fn new() -> Self {
        Self::new_with_account(PrivateKeySigner::random())
    }

    pub fn new_with_account(signer: PrivateKeySigner) -> Self {
        Self { signer, state: Arc::default() }
    }

    pub fn context(&self) -> ChainContext {
        ChainContext::new(Arc::new(self.clone()), Arc::new(self.clone()))
    }

    pub fn signer(&self) -> PrivateKeySigner {
        self.signer.clone()
    }

    pub fn account(&self) -> Address {
        self.signer.address()
    }

    pub fn chain_id_value(&self) -> u64 {
        CHAIN_ID
    }

    pub fn safe_singleton(&self) -> Address {
        SAFE_SINGLETON_ADDRESS
    }

    pub fn safe_factory(&self) -> Address {
        SAFE_PROXY_FACTORY_ADDRESS
    }

    pub fn module_factory(&self) -> Address {
        MODULE_PROXY_FACTORY_ADDRESS
    }

    pub fn roles_master_copy(&self) -> Address {
        Address::repeat_byte(0x96)
    }

    pub fn yield_factory(&self) -> Address {
        Address::repeat_byte(0xf4)
    }

    pub fn executor(&self) -> Address {
        Address::repeat_byte(0xe7)
    }

    // ---- knobs ----

    pub fn set_pending_nonce(&self, nonce: u64) {
        self.lock().next_nonce = nonce;
    }

    pub fn set_safe_creation_event(&self, event: CreationEvent) {
        self.lock().safe_event = event;
    }

    pub fn set_module_creation_event(&self, event: CreationEvent) {
        self.lock().module_event = event;
    }

    /// Every transaction to `address` reverts.
    pub fn revert_calls_to(&self, address: Address) {
        self.lock().reverting.insert(address);
    }

    /// Reject every send once `count` transactions went through.
    pub fn fail_sends_after(&self, count: usize) {
        self.lock().fail_sends_after = Some(count);
    }

    /// Install a Roles module owned by the signing account without a transaction.
    pub fn deploy_roles_directly(&self) -> Address {
        let address = Address::repeat_byte(0x4e);
        self.lock().roles.insert(address, RolesAccount { owner: self.account(), calls: Vec::new() });
        address
    }

    // ---- inspection ----

    pub fn sent_nonces(&self) -> Vec<u64> {
        self.lock().sent.iter().map(|(nonce, _)| *nonce).collect()
    }

    pub fn sent_hashes(&self) -> Vec<TxHash> {
        self.lock().sent.iter().map(|(_, hash)| *hash).collect()
    }

    pub fn safe_exists(&self, address: Address) -> bool {
        self.lock().safes.contains_key(&address)
    }

    pub fn roles_exists(&self, address: Address) -> bool {
        self.lock().roles.contains_key(&address)
    }

    pub fn module_enabled(&self, safe: Address, module: Address) -> bool {
        self.lock().safes.get(&safe).is_some_and(|s| s.modules.contains(&module))
    }

    pub fn role_calls(&self, roles: Address) -> Vec<RecordedRoleCall> {
        self.lock().roles.get(&roles).map(|r| r.calls.clone()).unwrap_or_default()
    }

    pub fn yield_reads(&self) -> usize {
        self.lock().yield_reads
    }

    /// Proxy address the simulated yield factory assigns to `(client, fee)`.
    pub fn yield_proxy_for(client: Address, fee: &FeeConfig) -> Address {
        let mut hasher = Keccak256::new();
        hasher.update(client);
        hasher.update(fee.deposit_bps.to_be_bytes());
        hasher.update(fee.profit_bps.to_be_bytes());
        Address::from_slice(&hasher.finalize()[12..])
    }

    /// EIP-712 digest of a zero-gas Safe transaction, as `getTransactionHash` computes it.
    pub fn safe_tx_hash(
        &self,
        safe: Address,
        to: Address,
        value: U256,
        data: &Bytes,
        operation: Operation,
        nonce: U256,
    ) -> B256 {
        let tx = SafeTx {
            to,
            value,
            data: data.clone(),
            operation: operation.into(),
            safeTxGas: U256::ZERO,
            baseGas: U256::ZERO,
            gasPrice: U256::ZERO,
            gasToken: Address::ZERO,
            refundReceiver: Address::ZERO,
            nonce,
        };
        tx.eip712_signing_hash(&eip712_domain! { chain_id: CHAIN_ID, verifying_contract: safe, })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    // ---- execution ----

    fn execute(&self, state: &mut State, tx: &TxRequest) -> Option<Vec<Log>> {
        if state.reverting.contains(&tx.to) {
            return None;
        }
        if tx.to == SAFE_PROXY_FACTORY_ADDRESS {
            return self.create_safe(state, &tx.data);
        }
        if tx.to == MODULE_PROXY_FACTORY_ADDRESS {
            return self.create_roles(state, &tx.data);
        }
        if state.roles.contains_key(&tx.to) {
            return self.roles_call(state, tx.to, &tx.data);
        }
        if state.safes.contains_key(&tx.to) {
            return self.exec_safe_transaction(state, tx.to, &tx.data);
        }
        None
    }

    fn create_safe(&self, state: &mut State, data: &[u8]) -> Option<Vec<Log>> {
        let call = ISafeProxyFactory::createProxyWithNonceCall::abi_decode(data).ok()?;
        let setup = ISafe::setupCall::abi_decode(&call.initializer).ok()?;

        let mut salt = Keccak256::new();
        salt.update(keccak256(&call.initializer));
        salt.update(call.saltNonce.to_be_bytes::<32>());
        let mut init_code = PROXY_CREATION_CODE.to_vec();
        init_code.extend_from_slice(&call.singleton.into_word()[..]);
        let proxy = SAFE_PROXY_FACTORY_ADDRESS.create2_from_code(salt.finalize(), init_code);

        if state.safes.contains_key(&proxy) {
            return None;
        }
        state.safes.insert(proxy, SafeAccount { owners: setup.owners, ..Default::default() });

        // SafeSetup from the new proxy precedes the factory event
        let mut logs = vec![Log {
            address: proxy,
            data: LogData::new_unchecked(
                vec![keccak256("SafeSetup(address,address[],uint256,address,address)")],
                Bytes::new(),
            ),
        }];
        let reported = match state.safe_event {
            CreationEvent::WrongAddress => Address::repeat_byte(0xbd),
            _ => proxy,
        };
        let event = match state.safe_event {
            CreationEvent::Suppressed => None,
            CreationEvent::SafeV130 => {
                Some(ISafeProxyFactoryV130::ProxyCreation { proxy: reported, singleton: call.singleton }.encode_log_data())
            }
            _ => Some(ISafeProxyFactoryV141::ProxyCreation { proxy: reported, singleton: call.singleton }.encode_log_data()),
        };
        logs.extend(event.map(|data| Log { address: SAFE_PROXY_FACTORY_ADDRESS, data }));
        Some(logs)
    }

    fn create_roles(&self, state: &mut State, data: &[u8]) -> Option<Vec<Log>> {
        let call = IModuleProxyFactory::deployModuleCall::abi_decode(data).ok()?;
        let setup = IRoles::setUpCall::abi_decode(&call.initializer).ok()?;
        let (owner, _avatar, _target) = <(Address, Address, Address)>::abi_decode_params(&setup.initParams).ok()?;

        let mut salt = Keccak256::new();
        salt.update(keccak256(&call.initializer));
        salt.update(call.saltNonce.to_be_bytes::<32>());
        let mut init_code = bytes!("602d8060093d393df3363d3d373d3d3d363d73").to_vec();
        init_code.extend_from_slice(call.masterCopy.as_slice());
        init_code.extend_from_slice(&bytes!("5af43d82803e903d91602b57fd5bf3"));
        let proxy = MODULE_PROXY_FACTORY_ADDRESS.create2_from_code(salt.finalize(), init_code);

        if state.roles.contains_key(&proxy) {
            return None;
        }
        state.roles.insert(proxy, RolesAccount { owner, calls: Vec::new() });

        let reported = match state.module_event {
            CreationEvent::WrongAddress => Address::repeat_byte(0xbd),
            _ => proxy,
        };
        let mut logs = vec![];
        if state.module_event != CreationEvent::Suppressed {
            let event = IModuleProxyFactory::ModuleProxyCreation { proxy: reported, masterCopy: call.masterCopy };
            logs.push(Log { address: MODULE_PROXY_FACTORY_ADDRESS, data: event.encode_log_data() });
        }
        Some(logs)
    }

    fn roles_call(&self, state: &mut State, roles: Address, data: &[u8]) -> Option<Vec<Log>> {
        let account = self.account();
        let module = state.roles.get_mut(&roles)?;
        if module.owner != account {
            return None;
        }

        let recorded = if let Ok(call) = IRoles::scopeTargetCall::abi_decode(data) {
            RecordedRoleCall::ScopeTarget(call.targetAddress)
        } else if let Ok(call) = IRoles::allowFunctionCall::abi_decode(data) {
            RecordedRoleCall::AllowFunction(call.targetAddress, call.selector, call.options)
        } else if let Ok(call) = IRoles::assignRolesCall::abi_decode(data) {
            RecordedRoleCall::AssignRoles(call.module)
        } else if let Ok(call) = IRoles::setDefaultRoleCall::abi_decode(data) {
            RecordedRoleCall::SetDefaultRole(call.module)
        } else {
            return None;
        };
        module.calls.push(recorded);
        Some(vec![])
    }

    fn exec_safe_transaction(&self, state: &mut State, safe: Address, data: &[u8]) -> Option<Vec<Log>> {
        let call = ISafe::execTransactionCall::abi_decode(data).ok()?;
        let operation = match call.operation {
            0 => Operation::Call,
            1 => Operation::DelegateCall,
            _ => return None,
        };
        let account = state.safes.get_mut(&safe)?;
        let digest = self.safe_tx_hash(safe, call.to, call.value, &call.data, operation, account.nonce);

        let signature = call.signatures.as_ref();
        if signature.len() != 65 || !(signature[64] == 27 || signature[64] == 28) {
            return None;
        }
        let signer = Signature::try_from(signature).ok()?.recover_address_from_prehash(&digest).ok()?;
        if !account.owners.contains(&signer) {
            return None;
        }
        account.nonce += U256::from(1);

        if call.to == safe {
            if let Ok(enable) = ISafe::enableModuleCall::abi_decode(&call.data) {
                account.modules.insert(enable.module);
            }
        }
        Some(vec![])
    }

    fn read(&self, to: Address, data: &[u8]) -> Option<Bytes> {
        let mut state = self.lock();

        if to == SAFE_PROXY_FACTORY_ADDRESS {
            ISafeProxyFactory::proxyCreationCodeCall::abi_decode(data).ok()?;
            return Some((Bytes::from_static(PROXY_CREATION_CODE),).abi_encode_params().into());
        }

        if to == self.yield_factory() {
            let call = IYieldProxyFactory::predictP2pYieldProxyAddressCall::abi_decode(data).ok()?;
            state.yield_reads += 1;
            let fee = FeeConfig::new(call.clientBasisPointsOfDeposit.to::<u64>(), call.clientBasisPointsOfProfit.to::<u64>());
            return Some((Self::yield_proxy_for(call.client, &fee),).abi_encode_params().into());
        }

        let safe = state.safes.get(&to)?;
        if ISafe::nonceCall::abi_decode(data).is_ok() {
            return Some((safe.nonce,).abi_encode_params().into());
        }
        if let Ok(call) = ISafe::isModuleEnabledCall::abi_decode(data) {
            return Some((safe.modules.contains(&call.module),).abi_encode_params().into());
        }
        let call = ISafe::getTransactionHashCall::abi_decode(data).ok()?;
        let operation = if call.operation == 1 { Operation::DelegateCall } else { Operation::Call };
        let hash = self.safe_tx_hash(to, call.to, call.value, &call.data, operation, call.nonce);
        Some((hash,).abi_encode_params().into())
    }
}

#[async_trait]
impl ChainReader for SimulatedChain {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(CHAIN_ID)
    }

    async fn pending_transaction_count(&self, account: Address) -> Result<u64, ChainError> {
        Ok(if account == self.account() { self.lock().next_nonce } else { 0 })
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ChainError> {
        self.read(to, &data).ok_or_else(|| ChainError::Rpc("execution reverted".into()))
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<TxReceipt, ChainError> {
        self.lock()
            .receipts
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| ChainError::Rpc(format!("unknown transaction {tx_hash}")))
    }
}

#[async_trait]
impl ChainWriter for SimulatedChain {
    fn address(&self) -> Address {
        self.account()
    }

    async fn send_transaction(&self, tx: TxRequest) -> Result<TxHash, ChainError> {
        let mut state = self.lock();

        if state.fail_sends_after.is_some_and(|limit| state.sent.len() >= limit) {
            return Err(ChainError::Rpc("simulated send failure".into()));
        }
        if tx.nonce != state.next_nonce {
            return Err(ChainError::Rpc(format!("nonce {} but expected {}", tx.nonce, state.next_nonce)));
        }
        state.next_nonce += 1;

        let mut hasher = Keccak256::new();
        hasher.update(self.account());
        hasher.update(tx.nonce.to_be_bytes());
        hasher.update(&tx.data);
        let tx_hash = hasher.finalize();

        let outcome = self.execute(&mut state, &tx);
        let receipt = TxReceipt { tx_hash, success: outcome.is_some(), logs: outcome.unwrap_or_default() };
        state.receipts.insert(tx_hash, receipt);
        state.sent.push((tx.nonce, tx_hash));
        Ok(tx_hash)
    }

    async fn sign_hash(&self, hash: B256) -> Result<Bytes, ChainError> {
        let signature = self.signer.sign_hash(&hash).await.map_err(|e| ChainError::Signing(e.to_string()))?;
        Ok(Bytes::copy_from_slice(&signature_to_bytes(&signature)))
    }
}

/// Minimal HTTP server answering every request with the same status and body.
#[derive(Debug)]
pub struct FeeEndpoint {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FeeEndpoint {
    pub async fn spawn(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Arc<Mutex<Vec<String>>> = Arc::default();

        let log = requests.clone();
        let body = body.to_string();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut head = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = stream.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    head.extend_from_slice(&chunk[..n]);
                    if head.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                log.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { addr, requests }
    }

    /// Accepts connections and never answers them.
    pub async fn spawn_unresponsive() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        Self { addr, requests: Arc::default() }
    }

    pub fn url(&self) -> String {
        format!("http://{}/fees", self.addr)
    }

    /// Raw request heads received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}
