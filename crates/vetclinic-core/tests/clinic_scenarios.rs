//! End-to-end clinic scenarios through the public services.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use vetclinic_core::access::visible_appointments;
use vetclinic_core::db::{AppointmentFilter, Database};
use vetclinic_core::models::{
    AppointmentRequest, AppointmentStatus, NewClient, NewConsultation, NewPet, NewStaffMember,
    NewVaccination, Sex, Species, StaffRole,
};
use vetclinic_core::records::{HistoryLimits, RecordsError, Registry};
use vetclinic_core::reporting::ReportAggregator;
use vetclinic_core::scheduling::{Scheduler, SchedulingError};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn staff(registry: &Registry<'_>, name: &str, role: StaffRole) -> i64 {
    registry
        .register_staff(&NewStaffMember::new(
            name,
            format!("{}@clinic.com", name.to_lowercase()),
            role,
        ))
        .unwrap()
        .id
}

#[test]
fn test_ana_gomez_books_rex() {
    let db = Database::open_in_memory().unwrap();
    let registry = Registry::new(&db);

    // Four other staff first so the veterinarian gets id 5.
    for name in ["Admin", "Sofia", "Marta", "Pablo"] {
        staff(&registry, name, StaffRole::Receptionist);
    }
    let vet_id = staff(&registry, "Laura", StaffRole::Veterinarian);
    assert_eq!(vet_id, 5);

    let ana = registry
        .register_client(&NewClient::new("Ana", "Gomez", "555-0100"))
        .unwrap();
    assert_eq!(ana.full_name(), "Ana Gomez");
    let rex = registry
        .register_pet(&NewPet::new(ana.id, "Rex", Species::Dog, Sex::Male))
        .unwrap();

    let scheduler = Scheduler::new(&db);
    let tomorrow = Utc::now() + Duration::days(1);
    let appointment = scheduler
        .schedule(&AppointmentRequest::new(rex.id, vet_id, tomorrow, "checkup"))
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.veterinarian_id, 5);

    let confirmed = scheduler
        .transition(appointment.id, AppointmentStatus::Confirmed)
        .unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let err = scheduler
        .transition(appointment.id, AppointmentStatus::Pending)
        .unwrap_err();
    assert!(matches!(
        err,
        SchedulingError::InvalidTransition {
            from: AppointmentStatus::Confirmed,
            to: AppointmentStatus::Pending
        }
    ));
}

#[test]
fn test_yesterday_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let registry = Registry::new(&db);
    let vet_id = staff(&registry, "Laura", StaffRole::Veterinarian);
    let ana = registry
        .register_client(&NewClient::new("Ana", "Gomez", "555-0100"))
        .unwrap();
    let rex = registry
        .register_pet(&NewPet::new(ana.id, "Rex", Species::Dog, Sex::Male))
        .unwrap();

    let yesterday = Utc::now() - Duration::days(1);
    let result = Scheduler::new(&db).schedule(&AppointmentRequest::new(rex.id, vet_id, yesterday, "checkup"));
    assert!(matches!(result, Err(SchedulingError::PastDate { .. })));
}

#[test]
fn test_due_vaccinations_june_window() {
    let db = Database::open_in_memory().unwrap();
    let registry = Registry::new(&db);
    let ana = registry
        .register_client(&NewClient::new("Ana", "Gomez", "555-0100"))
        .unwrap();
    let rex = registry
        .register_pet(&NewPet::new(ana.id, "Rex", Species::Dog, Sex::Male))
        .unwrap();

    let next_doses = [
        date(2024, 7, 1),
        date(2024, 5, 31),
        date(2024, 6, 1),
        date(2024, 7, 2),
        date(2024, 6, 18),
    ];
    for next in next_doses {
        registry
            .record_vaccination(&NewVaccination::new(rex.id, "Rabies", date(2024, 1, 1)).with_next_dose(next))
            .unwrap();
    }
    registry
        .record_vaccination(&NewVaccination::new(rex.id, "Parvovirus", date(2024, 1, 1)))
        .unwrap();

    let due = Scheduler::new(&db)
        .due_vaccinations(date(2024, 6, 1), 30)
        .unwrap();
    let dates: Vec<_> = due.iter().map(|v| v.next_dose_on.unwrap()).collect();
    assert_eq!(
        dates,
        vec![date(2024, 6, 1), date(2024, 6, 18), date(2024, 7, 1)]
    );
}

#[test]
fn test_overdue_flag() {
    let today = Utc::now().date_naive();
    let overdue = NewVaccination::new(1, "Rabies", today - Duration::days(400))
        .with_next_dose(today - Duration::days(1))
        .validate()
        .unwrap();
    assert!(overdue.is_overdue());

    let open_ended = NewVaccination::new(1, "Rabies", today - Duration::days(400))
        .validate()
        .unwrap();
    assert!(!open_ended.is_overdue());
}

#[test]
fn test_veterinarian_visibility() {
    let db = Database::open_in_memory().unwrap();
    let registry = Registry::new(&db);
    let laura = staff(&registry, "Laura", StaffRole::Veterinarian);
    let marcos = staff(&registry, "Marcos", StaffRole::Veterinarian);
    let sofia = staff(&registry, "Sofia", StaffRole::Receptionist);
    let ana = registry
        .register_client(&NewClient::new("Ana", "Gomez", "555-0100"))
        .unwrap();
    let rex = registry
        .register_pet(&NewPet::new(ana.id, "Rex", Species::Dog, Sex::Male))
        .unwrap();

    let scheduler = Scheduler::new(&db);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    for (vet, hour) in [(laura, 9), (marcos, 10), (laura, 11)] {
        let when = Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
        scheduler
            .schedule_at(&AppointmentRequest::new(rex.id, vet, when, "checkup"), now)
            .unwrap();
    }

    let all = scheduler.list_appointments(&AppointmentFilter::default()).unwrap();
    let laura_ctx = registry.get_staff(laura).unwrap().context();
    let sofia_ctx = registry.get_staff(sofia).unwrap().context();

    let visible = visible_appointments(&laura_ctx, &all);
    assert_eq!(visible.len(), 2);
    assert!(visible.iter().all(|a| a.veterinarian_id == laura));
    assert_eq!(visible_appointments(&sofia_ctx, &all).len(), 3);

    // Same answer when the store applies the scope.
    let scoped = scheduler
        .list_appointments_for(&laura_ctx, &AppointmentFilter::default())
        .unwrap();
    assert_eq!(scoped.len(), 2);

    // Deactivated staff see nothing.
    registry.deactivate_staff(laura).unwrap();
    let inactive = registry.get_staff(laura).unwrap().context();
    assert!(visible_appointments(&inactive, &all).is_empty());
}

#[test]
fn test_removal_rules() {
    let db = Database::open_in_memory().unwrap();
    let registry = Registry::new(&db);
    let vet = staff(&registry, "Laura", StaffRole::Veterinarian);
    let vaccinator = staff(&registry, "Marcos", StaffRole::Veterinarian);
    let ana = registry
        .register_client(&NewClient::new("Ana", "Gomez", "555-0100"))
        .unwrap();
    let rex = registry
        .register_pet(&NewPet::new(ana.id, "Rex", Species::Dog, Sex::Male))
        .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let appointment = Scheduler::new(&db)
        .schedule_at(
            &AppointmentRequest::new(rex.id, vet, now + Duration::hours(1), "checkup"),
            now,
        )
        .unwrap();
    let vet_ctx = registry.get_staff(vet).unwrap().context();
    registry
        .record_consultation(
            &vet_ctx,
            &NewConsultation::new(appointment.id, rex.id, appointment.scheduled_at, "checkup"),
        )
        .unwrap();
    let mut vaccination = NewVaccination::new(rex.id, "Rabies", date(2024, 6, 1));
    vaccination.veterinarian_id = Some(vaccinator);
    registry.record_vaccination(&vaccination).unwrap();

    // Restrict: client with pets, vet with appointments.
    assert!(matches!(registry.remove_client(ana.id), Err(RecordsError::Conflict(_))));
    assert!(matches!(registry.remove_staff(vet), Err(RecordsError::Conflict(_))));

    // Set null: the vaccinator leaves, the vaccination stays.
    assert_eq!(registry.remove_staff(vaccinator).unwrap(), 1);
    let history = registry.pet_history(rex.id, HistoryLimits::default()).unwrap();
    assert_eq!(history.vaccinations.len(), 1);
    assert_eq!(history.vaccinations[0].veterinarian_id, None);
    assert_eq!(history.consultations.len(), 1);

    // Cascade: the pet takes its records along.
    let removal = registry.remove_pet(rex.id).unwrap();
    assert_eq!(removal.appointments, 1);
    assert_eq!(removal.consultations, 1);
    assert_eq!(removal.vaccinations, 1);

    // Nothing references either of them now.
    registry.remove_staff(vet).unwrap();
    registry.remove_client(ana.id).unwrap();
}

#[test]
fn test_dashboard_after_busy_day() {
    let db = Database::open_in_memory().unwrap();
    let registry = Registry::new(&db);
    let vet = staff(&registry, "Laura", StaffRole::Veterinarian);
    let ana = registry
        .register_client(&NewClient::new("Ana", "Gomez", "555-0100"))
        .unwrap();
    let rex = registry
        .register_pet(&NewPet::new(ana.id, "Rex", Species::Dog, Sex::Male))
        .unwrap();
    registry
        .register_pet(&NewPet::new(ana.id, "Mishi", Species::Cat, Sex::Female))
        .unwrap();
    registry
        .register_pet(&NewPet::new(ana.id, "Toby", Species::Dog, Sex::Male))
        .unwrap();

    let scheduler = Scheduler::new(&db);
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let first = scheduler
        .schedule_at(
            &AppointmentRequest::new(rex.id, vet, now + Duration::hours(1), "checkup"),
            now,
        )
        .unwrap();
    scheduler
        .schedule_at(
            &AppointmentRequest::new(rex.id, vet, now + Duration::hours(2), "vaccine"),
            now,
        )
        .unwrap();
    scheduler
        .transition_at(first.id, AppointmentStatus::Cancelled, now)
        .unwrap();

    let dashboard = ReportAggregator::new(&db).dashboard(now).unwrap();
    assert_eq!(dashboard.counts.active_clients, 1);
    assert_eq!(dashboard.counts.active_pets, 3);
    assert_eq!(dashboard.counts.open_appointments_today, 1);
    assert_eq!(dashboard.todays_appointments.len(), 2);
    assert_eq!(dashboard.upcoming_appointments.len(), 1);
    assert_eq!(dashboard.upcoming_appointments[0].client_name, "Ana Gomez");
    assert_eq!(dashboard.species[0].species, Species::Dog);
    assert_eq!(dashboard.species[0].count, 2);
}
