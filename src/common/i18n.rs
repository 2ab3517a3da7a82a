// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_LANG: &str = "en";

// (código, inglês, português)
const MESSAGES: &[(&str, &str, &str)] = &[
    // --- Genéricos ---
    ("validation_failed", "One or more fields are invalid.", "Um ou mais campos são inválidos."),
    ("forbidden", "You are not allowed to perform this action.", "Você não tem permissão para realizar esta ação."),
    ("internal_error", "An unexpected error occurred.", "Ocorreu um erro inesperado."),
    ("already_exists", "The record already exists.", "O registro já existe."),
    ("required", "This field is required.", "Este campo é obrigatório."),
    ("invalid_email", "Invalid e-mail.", "E-mail inválido."),
    ("password_too_short", "Password must have at least 6 characters.", "A senha deve ter no mínimo 6 caracteres."),
    ("out_of_range", "Value out of range.", "Valor fora do intervalo permitido."),
    ("invalid_url", "Invalid URL.", "URL inválida."),

    // --- Auth ---
    ("email_already_exists", "This e-mail is already in use.", "Este e-mail já está em uso."),
    ("invalid_credentials", "Invalid e-mail or password.", "E-mail ou senha inválidos."),
    ("invalid_token", "Missing or invalid authentication token.", "Token de autenticação inválido ou ausente."),
    ("user_not_found", "User not found.", "Usuário não encontrado."),

    // --- Não encontrados ---
    ("sport_not_found", "Sport not found.", "Esporte não encontrado."),
    ("tier_not_found", "Tier not found.", "Plano não encontrado."),
    ("sport_service_not_found", "Service not found.", "Serviço não encontrado."),
    ("club_not_found", "Club not found.", "Clube não encontrado."),
    ("membership_not_found", "Membership not found.", "Matrícula não encontrada."),
    ("trainer_profile_not_found", "Trainer profile not found.", "Perfil de treinador não encontrado."),
    ("trainer_session_not_found", "Session not found.", "Sessão não encontrada."),
    ("trainer_request_not_found", "Trainer request not found.", "Solicitação de treinador não encontrada."),
    ("service_purchase_not_found", "Service purchase not found.", "Compra de serviço não encontrada."),
    ("check_in_not_found", "Check-in not found.", "Check-in não encontrado."),
    ("event_not_found", "Event not found.", "Evento não encontrado."),
    ("event_registration_not_found", "Registration not found.", "Inscrição não encontrada."),
    ("notification_not_found", "Notification not found.", "Notificação não encontrada."),

    // --- Conflitos de estado ---
    ("membership_without_tier", "The membership has no tier to renew.", "A matrícula não possui plano para renovar."),
    ("membership_cancelled", "The membership is cancelled.", "A matrícula está cancelada."),
    ("session_not_completable", "The session cannot be completed.", "A sessão não pode ser concluída."),
    ("session_not_cancellable", "The session cannot be cancelled.", "A sessão não pode ser cancelada."),
    ("session_not_rateable", "The session cannot be rated.", "A sessão não pode ser avaliada."),
    ("request_not_pending", "The request is no longer pending.", "A solicitação não está mais pendente."),
    ("request_expired", "The request has expired.", "A solicitação expirou."),
    ("purchase_not_completable", "The purchase cannot be completed.", "A compra não pode ser concluída."),
    ("purchase_not_cancellable", "The purchase cannot be cancelled.", "A compra não pode ser cancelada."),
    ("already_checked_out", "Check-out already recorded.", "Saída já registrada."),
    ("event_not_publishable", "The event cannot be published.", "O evento não pode ser publicado."),
    ("event_not_cancellable", "The event cannot be cancelled.", "O evento não pode ser cancelado."),
    ("event_not_completable", "The event cannot be completed.", "O evento não pode ser concluído."),
    ("event_not_open", "The event is not open for registration.", "O evento não está aberto para inscrições."),
    ("event_full", "The event is full.", "O evento está lotado."),
    ("registration_not_payable", "The registration does not accept payment.", "A inscrição não aceita pagamento."),
    ("registration_already_cancelled", "The registration is already cancelled.", "A inscrição já está cancelada."),
    ("monthly_reset_already_done", "Monthly counters were already reset for this period.", "Os contadores mensais já foram zerados neste período."),

    // --- Regras de campo ---
    ("sport_mismatch", "Trainer and membership belong to different sports.", "Treinador e matrícula são de esportes diferentes."),
    ("tier_sport_mismatch", "The tier does not belong to this sport.", "O plano não pertence a este esporte."),
    ("tier_unavailable", "The tier is not available.", "O plano não está disponível."),
    ("active_membership_exists", "There is already an active membership for this sport.", "Já existe uma matrícula ativa para este esporte."),
    ("membership_not_owned", "The membership does not belong to this user.", "A matrícula não pertence a este usuário."),
    ("membership_inactive", "The membership is not active.", "A matrícula não está ativa."),
    ("membership_expired", "The membership has expired.", "A matrícula expirou."),
    ("service_inactive", "The service is not active.", "O serviço não está ativo."),
    ("service_sport_mismatch", "The service does not belong to the membership's sport.", "O serviço não pertence ao esporte da matrícula."),
    ("past_session_date", "The session date cannot be in the past.", "A data da sessão não pode estar no passado."),
    ("invalid_duration", "Duration is outside the allowed range.", "A duração está fora do intervalo permitido."),
    ("session_crosses_midnight", "The session must end on the same day it starts.", "A sessão deve terminar no mesmo dia em que começa."),
    ("invalid_fee", "Fee cannot be negative.", "O valor não pode ser negativo."),
    ("invalid_amount", "Amount cannot be negative.", "O valor não pode ser negativo."),
    ("invalid_rating", "Rating must be between 1 and 5.", "A avaliação deve estar entre 1 e 5."),
    ("empty_time_slots", "At least one time slot is required.", "Informe ao menos um horário."),
    ("invalid_time_slot", "Each slot must end after it starts.", "Cada horário deve terminar depois de começar."),
    ("invalid_time_window", "The end time must be after the start time.", "O horário final deve ser depois do inicial."),
    ("availability_overlap", "The window overlaps an existing availability.", "O horário conflita com uma disponibilidade existente."),
    ("invalid_date_range", "The end date must not be before the start date.", "A data final não pode ser anterior à inicial."),
    ("trainer_not_active", "The trainer is not verified or not available.", "O treinador não está verificado ou disponível."),
    ("club_sport_mismatch", "The membership does not give access to this club.", "A matrícula não dá acesso a este clube."),
    ("no_active_membership", "No active membership for this club's sport.", "Nenhuma matrícula ativa para o esporte deste clube."),
    ("invalid_capacity", "Capacity must be greater than zero.", "A capacidade deve ser maior que zero."),
    ("invalid_discount", "Discount must be between 0 and 100.", "O desconto deve estar entre 0 e 100."),
    ("invalid_period", "Period must use the YYYY-MM format.", "O período deve usar o formato AAAA-MM."),
    ("invalid_purchase_status", "A purchase must start as upcoming or completed.", "A compra deve começar como agendada ou concluída."),
    ("not_a_trainer", "You do not have a trainer profile.", "Você não possui perfil de treinador."),
    ("not_request_target", "The request is addressed to another trainer.", "A solicitação é para outro treinador."),

    // --- Unicidade ---
    ("membership_number_taken", "Membership number already in use.", "Número de matrícula já utilizado."),
    ("trainer_profile_exists", "The user already has a trainer profile.", "O usuário já possui perfil de treinador."),
    ("availability_exists", "This availability window already exists.", "Esta disponibilidade já existe."),
    ("specialty_exists", "Specialty already registered.", "Especialidade já cadastrada."),
    ("sport_name_taken", "A sport with this name already exists.", "Já existe um esporte com esse nome."),
    ("tier_name_taken", "A tier with this name already exists for the sport.", "Já existe um plano com esse nome para o esporte."),
    ("already_registered", "You are already registered for this event.", "Você já está inscrito neste evento."),
    // --- Sucesso ---
    ("ok", "Request completed successfully.", "Requisição concluída com sucesso."),
    ("created", "Record created successfully.", "Registro criado com sucesso."),
    ("deleted", "Record deleted successfully.", "Registro removido com sucesso."),
    ("user_registered", "User registered successfully.", "Usuário registrado com sucesso."),
    ("logged_in", "Login successful.", "Login realizado com sucesso."),
    ("membership_purchased", "Membership purchased successfully.", "Matrícula comprada com sucesso."),
    ("membership_renewed", "Membership renewed successfully.", "Matrícula renovada com sucesso."),
    ("membership_updated", "Membership updated successfully.", "Matrícula atualizada com sucesso."),
    ("session_booked", "Session booked successfully.", "Sessão agendada com sucesso."),
    ("session_updated", "Session updated successfully.", "Sessão atualizada com sucesso."),
    ("request_created", "Trainer request created successfully.", "Solicitação de treinador criada com sucesso."),
    ("request_updated", "Trainer request updated successfully.", "Solicitação de treinador atualizada com sucesso."),
    ("check_in_recorded", "Check-in recorded.", "Check-in registrado."),
    ("check_out_recorded", "Check-out recorded.", "Saída registrada."),
    ("purchase_recorded", "Service purchase recorded.", "Compra de serviço registrada."),
    ("purchase_updated", "Service purchase updated.", "Compra de serviço atualizada."),
    ("event_updated", "Event updated successfully.", "Evento atualizado com sucesso."),
    ("event_registered", "Registration confirmed.", "Inscrição realizada."),
    ("counters_reset", "Monthly counters reset.", "Contadores mensais zerados."),
    ("renewals_processed", "Automatic renewals processed.", "Renovações automáticas processadas."),
    ("requests_expired", "Stale requests expired.", "Solicitações vencidas expiradas."),
    ("notification_read", "Notification marked as read.", "Notificação marcada como lida."),
];

/// Catálogo de mensagens em memória (código -> idioma -> texto).
#[derive(Clone)]
pub struct I18nStore {
    messages: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl Default for I18nStore {
    fn default() -> Self {
        let mut messages: HashMap<&'static str, HashMap<&'static str, &'static str>> = HashMap::new();
        for (code, en, pt) in MESSAGES {
            let entry = messages.entry(*code).or_default();
            entry.insert("en", *en);
            entry.insert("pt", *pt);
        }
        Self { messages: Arc::new(messages) }
    }
}

impl I18nStore {
    /// Traduz o código. Idioma desconhecido cai para inglês;
    /// código desconhecido volta como está.
    pub fn translate(&self, lang: &str, code: &str) -> String {
        match self.messages.get(code) {
            Some(by_lang) => by_lang
                .get(lang)
                .or_else(|| by_lang.get(DEFAULT_LANG))
                .map(|m| m.to_string())
                .unwrap_or_else(|| code.to_string()),
            None => code.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_to_requested_language() {
        let store = I18nStore::default();
        assert_eq!(store.translate("pt", "event_full"), "O evento está lotado.");
        assert_eq!(store.translate("en", "event_full"), "The event is full.");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::default();
        assert_eq!(store.translate("de", "forbidden"), "You are not allowed to perform this action.");
    }

    #[test]
    fn unknown_code_is_returned_verbatim() {
        let store = I18nStore::default();
        assert_eq!(store.translate("pt", "some_new_code"), "some_new_code");
    }
}
