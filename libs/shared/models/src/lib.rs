pub mod appointment;
pub mod error;
pub mod patient;
pub mod schedule;

pub use appointment::{
    Appointment, AppointmentDetails, AppointmentStatus, NewAppointment, OccupiedInterval,
};
pub use error::{AppError, ErrorKind};
pub use patient::{NewPatient, Patient, PatientUpdate};
pub use schedule::{Closure, ScheduleInvariantError, Service, Specialist, WorkSchedule};
