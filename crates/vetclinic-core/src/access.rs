//! Role-based visibility rules.
//!
//! These are filters over records, not authentication: the caller's
//! [`StaffContext`] comes from the identity collaborator and is trusted as given.
//! An inactive context sees nothing.

use crate::models::{Appointment, Consultation, StaffContext, StaffMember, StaffRole};

/// Which appointments a caller may see, in a form the store can push into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppointmentScope {
    #[default]
    All,
    Veterinarian(i64),
    Nothing,
}

impl AppointmentScope {
    pub fn admits(&self, appointment: &Appointment) -> bool {
        match self {
            AppointmentScope::All => true,
            AppointmentScope::Veterinarian(id) => appointment.veterinarian_id == *id,
            AppointmentScope::Nothing => false,
        }
    }
}

/// Appointment scope for a caller. Receptionists schedule for everyone.
pub fn appointment_scope(ctx: &StaffContext) -> AppointmentScope {
    if !ctx.active {
        return AppointmentScope::Nothing;
    }
    match ctx.role {
        StaffRole::Admin | StaffRole::Receptionist => AppointmentScope::All,
        StaffRole::Veterinarian => AppointmentScope::Veterinarian(ctx.id),
    }
}

pub fn can_view_appointment(ctx: &StaffContext, appointment: &Appointment) -> bool {
    appointment_scope(ctx).admits(appointment)
}

pub fn visible_appointments<'a, I>(ctx: &StaffContext, appointments: I) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let scope = appointment_scope(ctx);
    appointments.into_iter().filter(|a| scope.admits(a)).collect()
}

/// Veterinarians see the consultations they recorded; admins and receptionists see all.
pub fn can_view_consultation(ctx: &StaffContext, consultation: &Consultation) -> bool {
    if !ctx.active {
        return false;
    }
    match ctx.role {
        StaffRole::Admin | StaffRole::Receptionist => true,
        StaffRole::Veterinarian => consultation.veterinarian_id == ctx.id,
    }
}

pub fn visible_consultations<'a, I>(ctx: &StaffContext, consultations: I) -> Vec<&'a Consultation>
where
    I: IntoIterator<Item = &'a Consultation>,
{
    consultations
        .into_iter()
        .filter(|c| can_view_consultation(ctx, c))
        .collect()
}

/// Admins see every staff record; everyone else only their own.
pub fn can_view_user(ctx: &StaffContext, user: &StaffMember) -> bool {
    if !ctx.active {
        return false;
    }
    ctx.role == StaffRole::Admin || user.id == ctx.id
}

pub fn visible_users<'a, I>(ctx: &StaffContext, users: I) -> Vec<&'a StaffMember>
where
    I: IntoIterator<Item = &'a StaffMember>,
{
    users
        .into_iter()
        .filter(|u| can_view_user(ctx, u))
        .collect()
}

/// Roles allowed to write consultation records.
pub fn can_record_consultation(ctx: &StaffContext) -> bool {
    ctx.active && matches!(ctx.role, StaffRole::Veterinarian | StaffRole::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentRequest, NewConsultation, NewStaffMember};
    use chrono::{TimeZone, Utc};

    fn ctx(id: i64, role: StaffRole) -> StaffContext {
        StaffContext {
            id,
            role,
            active: true,
        }
    }

    fn appointment(id: i64, vet: i64) -> Appointment {
        let when = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let mut appt = AppointmentRequest::new(1, vet, when, "checkup")
            .validate(30)
            .unwrap();
        appt.id = id;
        appt
    }

    fn staff(id: i64, role: StaffRole) -> StaffMember {
        let mut member = NewStaffMember::new(format!("Staff {}", id), format!("s{}@clinic.com", id), role)
            .validate()
            .unwrap();
        member.id = id;
        member
    }

    #[test]
    fn test_admin_and_receptionist_see_all_appointments() {
        let appts = vec![appointment(1, 5), appointment(2, 6)];
        assert_eq!(visible_appointments(&ctx(1, StaffRole::Admin), &appts).len(), 2);
        assert_eq!(
            visible_appointments(&ctx(2, StaffRole::Receptionist), &appts).len(),
            2
        );
    }

    #[test]
    fn test_veterinarian_sees_own_appointments() {
        let appts = vec![appointment(1, 5), appointment(2, 6), appointment(3, 5)];
        let visible = visible_appointments(&ctx(5, StaffRole::Veterinarian), &appts);
        let ids: Vec<_> = visible.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_inactive_sees_nothing() {
        let appts = vec![appointment(1, 5)];
        let mut admin = ctx(1, StaffRole::Admin);
        admin.active = false;
        assert!(visible_appointments(&admin, &appts).is_empty());
        assert_eq!(appointment_scope(&admin), AppointmentScope::Nothing);
        assert!(!can_view_user(&admin, &staff(1, StaffRole::Admin)));
    }

    #[test]
    fn test_visible_users() {
        let users = vec![
            staff(1, StaffRole::Admin),
            staff(2, StaffRole::Veterinarian),
            staff(3, StaffRole::Receptionist),
        ];
        assert_eq!(visible_users(&ctx(1, StaffRole::Admin), &users).len(), 3);

        let own = visible_users(&ctx(3, StaffRole::Receptionist), &users);
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].id, 3);
    }

    #[test]
    fn test_veterinarian_sees_own_consultations() {
        let when = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let mine = NewConsultation::new(1, 1, when, "cough").validate(5).unwrap();
        let theirs = NewConsultation::new(2, 1, when, "cough").validate(6).unwrap();
        let all = vec![mine, theirs];

        let visible = visible_consultations(&ctx(5, StaffRole::Veterinarian), &all);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].veterinarian_id, 5);
        assert_eq!(
            visible_consultations(&ctx(9, StaffRole::Receptionist), &all).len(),
            2
        );
    }

    #[test]
    fn test_recording_roles() {
        assert!(can_record_consultation(&ctx(1, StaffRole::Veterinarian)));
        assert!(can_record_consultation(&ctx(1, StaffRole::Admin)));
        assert!(!can_record_consultation(&ctx(1, StaffRole::Receptionist)));
    }
}
