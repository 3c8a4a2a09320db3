mod health_check;
mod notifications;
mod subscriptions;
mod weather;
