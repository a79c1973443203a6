// programs/parasol_core/src/sigverify.rs
//
// Signed-Approval Verification
// ============================
// Off-chain approvals (claim sign-off, insurance purchase sign-off) arrive
// as an Ed25519Program verify instruction placed immediately before the
// program instruction that consumes them. The runtime has already checked
// the signature itself; introspection only has to confirm that the verified
// public key and message are the ones this approval is bound to.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::ed25519_program;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar::instructions as tx_instructions;

/* Ed25519 instruction data layout:
 * num_signatures: u8
 * padding: u8
 * signature_offset: u16
 * signature_instruction_index: u16
 * public_key_offset: u16
 * public_key_instruction_index: u16
 * message_data_offset: u16
 * message_data_size: u16
 * message_instruction_index: u16
 * ... signature / public key / message bytes ...
 */
const ED25519_HEADER_LEN: usize = 16;
const PUBKEY_LEN: usize = 32;

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Check that `ix` is a single-signature Ed25519Program verify instruction
/// whose public key and message match exactly. The key and message must be
/// carried inline in the same instruction (instruction index u16::MAX).
pub fn ed25519_ix_verifies(ix: &Instruction, pubkey: &[u8; 32], message: &[u8]) -> bool {
    if ix.program_id != ed25519_program::ID {
        return false;
    }
    let data = &ix.data;
    if data.len() < ED25519_HEADER_LEN || data[0] != 1 {
        return false;
    }

    let pubkey_offset = match read_u16(data, 6) {
        Some(v) => v as usize,
        None => return false,
    };
    let pubkey_ix_index = read_u16(data, 8);
    let message_offset = match read_u16(data, 10) {
        Some(v) => v as usize,
        None => return false,
    };
    let message_size = match read_u16(data, 12) {
        Some(v) => v as usize,
        None => return false,
    };
    let message_ix_index = read_u16(data, 14);

    // Key and message must live in this instruction, not a sibling
    if pubkey_ix_index != Some(u16::MAX) || message_ix_index != Some(u16::MAX) {
        return false;
    }

    let signed_key = match data.get(pubkey_offset..pubkey_offset + PUBKEY_LEN) {
        Some(k) => k,
        None => return false,
    };
    let signed_message = match data.get(message_offset..message_offset + message_size) {
        Some(m) => m,
        None => return false,
    };

    signed_key == pubkey && signed_message == message
}

/// Load the instruction immediately preceding the current one from the
/// instructions sysvar and verify it is an Ed25519 approval for
/// (`pubkey`, `message`). Returns false when this is the first instruction
/// of the transaction or the sysvar cannot be read.
pub fn preceding_ed25519_verifies(
    ix_sysvar: &AccountInfo,
    pubkey: &[u8; 32],
    message: &[u8],
) -> bool {
    let current_index = match tx_instructions::load_current_index_checked(ix_sysvar) {
        Ok(i) => i as usize,
        Err(_) => return false,
    };
    if current_index == 0 {
        return false;
    }
    let prev_ix = match tx_instructions::load_instruction_at_checked(current_index - 1, ix_sysvar) {
        Ok(ix) => ix,
        Err(_) => return false,
    };
    ed25519_ix_verifies(&prev_ix, pubkey, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_ed25519_ix(pubkey: &[u8; 32], message: &[u8]) -> Instruction {
        // Mirrors the layout produced by the Ed25519Program's
        // new_ed25519_instruction constructor: header, signature, key, message.
        let sig_offset = ED25519_HEADER_LEN;
        let pubkey_offset = sig_offset + 64;
        let message_offset = pubkey_offset + PUBKEY_LEN;

        let mut data = Vec::with_capacity(message_offset + message.len());
        data.push(1); // num_signatures
        data.push(0); // padding
        data.extend_from_slice(&(sig_offset as u16).to_le_bytes());
        data.extend_from_slice(&u16::MAX.to_le_bytes());
        data.extend_from_slice(&(pubkey_offset as u16).to_le_bytes());
        data.extend_from_slice(&u16::MAX.to_le_bytes());
        data.extend_from_slice(&(message_offset as u16).to_le_bytes());
        data.extend_from_slice(&(message.len() as u16).to_le_bytes());
        data.extend_from_slice(&u16::MAX.to_le_bytes());
        data.extend_from_slice(&[0u8; 64]); // signature (checked by the runtime)
        data.extend_from_slice(pubkey);
        data.extend_from_slice(message);

        Instruction {
            program_id: ed25519_program::ID,
            accounts: vec![],
            data,
        }
    }

    #[test]
    fn test_accepts_matching_key_and_message() {
        let pubkey = [7u8; 32];
        let message = b"approval digest".to_vec();
        let ix = build_ed25519_ix(&pubkey, &message);
        assert!(ed25519_ix_verifies(&ix, &pubkey, &message));
    }

    #[test]
    fn test_rejects_wrong_key() {
        let pubkey = [7u8; 32];
        let message = b"approval digest".to_vec();
        let ix = build_ed25519_ix(&pubkey, &message);
        assert!(!ed25519_ix_verifies(&ix, &[8u8; 32], &message));
    }

    #[test]
    fn test_rejects_wrong_message() {
        let pubkey = [7u8; 32];
        let ix = build_ed25519_ix(&pubkey, b"approval digest");
        assert!(!ed25519_ix_verifies(&ix, &pubkey, b"another digest"));
    }

    #[test]
    fn test_rejects_foreign_program() {
        let pubkey = [7u8; 32];
        let message = b"approval digest".to_vec();
        let mut ix = build_ed25519_ix(&pubkey, &message);
        ix.program_id = crate::ID;
        assert!(!ed25519_ix_verifies(&ix, &pubkey, &message));
    }

    #[test]
    fn test_rejects_multi_signature_batch() {
        let pubkey = [7u8; 32];
        let message = b"approval digest".to_vec();
        let mut ix = build_ed25519_ix(&pubkey, &message);
        ix.data[0] = 2;
        assert!(!ed25519_ix_verifies(&ix, &pubkey, &message));
    }

    #[test]
    fn test_rejects_cross_instruction_references() {
        let pubkey = [7u8; 32];
        let message = b"approval digest".to_vec();
        let mut ix = build_ed25519_ix(&pubkey, &message);
        // point the public key at instruction 0 instead of inline
        ix.data[8] = 0;
        ix.data[9] = 0;
        assert!(!ed25519_ix_verifies(&ix, &pubkey, &message));
    }

    #[test]
    fn test_rejects_truncated_data() {
        let pubkey = [7u8; 32];
        let message = b"approval digest".to_vec();
        let mut ix = build_ed25519_ix(&pubkey, &message);
        ix.data.truncate(ED25519_HEADER_LEN + 64 + 16);
        assert!(!ed25519_ix_verifies(&ix, &pubkey, &message));
    }
}
