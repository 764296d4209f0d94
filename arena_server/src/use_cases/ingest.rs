// Chain-side events entering the world: matches, purchases and settlements.

use super::types::{Audience, MatchCreated, MatchSettled, PurchaseMade, ServerEvent};
use super::world::World;
use crate::domain::errors::IngestError;
use crate::domain::tuning::reward::lamports_to_sol;
use crate::domain::{Room, Vec3, ViewerEffect, ViewerEffectKind};
use tracing::info;

impl World {
    /// Opens a room for a freshly created on-chain match. Duplicates are ignored.
    pub fn match_created(&mut self, event: MatchCreated) -> Result<(), IngestError> {
        if event.match_addr.is_empty() {
            return Err(IngestError::MissingMatchAddress);
        }
        if self.store.room(&event.match_addr).is_some() {
            return Ok(());
        }

        let created_at = match u64::try_from(event.timestamp) {
            Ok(secs) if secs > 0 => secs.saturating_mul(1000),
            _ => self.clock.now_epoch_millis(),
        };
        let short: String = event.match_addr.chars().take(8).collect();
        self.store.insert_room(Room::for_chain_match(
            event.match_addr.clone(),
            format!("Anchor Match {short}"),
            self.settings.room_capacity,
            created_at,
        ));
        self.mark_rooms_dirty();

        info!(match_addr = %event.match_addr, creator = %event.creator, "anchor match created");
        self.emit(
            Audience::All,
            ServerEvent::AnchorMatchCreated {
                match_id: event.match_addr,
                creator: event.creator,
                timestamp: event.timestamp,
            },
        );
        Ok(())
    }

    /// Turns a viewer purchase into a world effect and relays the purchase.
    pub fn purchase(&mut self, event: PurchaseMade) -> Result<(), IngestError> {
        let lamports = event.lamports()?;
        let amount = lamports_to_sol(lamports);
        let kind = ViewerEffectKind::from_code(event.effect_type)
            .unwrap_or_else(|| ViewerEffectKind::from_amount(amount));

        let effect = ViewerEffect {
            id: self.next_id("anchor"),
            kind,
            position: Some(Vec3::new(0.0, 1.0, 0.0)),
            wallet_address: event.buyer.clone(),
            amount,
            timestamp: self.clock.now_epoch_millis(),
            transaction_ref: format!("{}-{}", event.buyer, event.timestamp),
        };

        info!(
            buyer = %event.buyer,
            match_addr = %event.match_addr,
            effect_type = event.effect_type,
            effect = kind.label(),
            lamports,
            "anchor purchase"
        );
        self.trigger_effect(effect);
        self.emit(Audience::All, ServerEvent::AnchorPurchase(event));
        Ok(())
    }

    /// Closes the room of a settled match, if any, and relays the settlement.
    pub fn match_settled(&mut self, event: MatchSettled) -> Result<(), IngestError> {
        if let Some(room) = self.store.room_mut(&event.match_addr) {
            room.active = false;
            self.mark_rooms_dirty();
        }

        info!(
            match_addr = %event.match_addr,
            winner = event.winner.as_deref(),
            pot = %event.pot,
            "anchor match settled"
        );
        self.emit(Audience::All, ServerEvent::AnchorMatchSettled(event));
        Ok(())
    }

    /// Stores a viewer effect and announces it to every session.
    pub fn trigger_effect(&mut self, effect: ViewerEffect) {
        self.store.insert_effect(effect.clone());
        self.emit(Audience::All, ServerEvent::EffectTriggered(effect));
    }
}
