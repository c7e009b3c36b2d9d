// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use alloy::sol;

sol! {
    #[derive(Debug)]
    #[sol(rpc)]
    contract WalletTrap {
        function collect() external view returns (bytes memory);
        function analyze(bytes calldata data) external view returns (bool shouldRespond, bytes memory responseData);
        function safeVault() external view returns (address);
        function monitoredWallet() external view returns (address);
        function updateNonce() external;
    }
}
