//! Rendering of the admin "new order" notification.

use odk_mailer::Email;

pub(crate) fn order_email(
    to: &str,
    app_name: &str,
    order_id: u64,
    username: &str,
    service: &str,
    proof_url: &str,
) -> Email {
    let subject = format!("New order #{order_id} is waiting");

    let text = format!(
        "A new order has arrived and needs processing.\n\n\
         Order:         #{order_id}\n\
         Account:       {username}\n\
         Service:       {service}\n\
         Payment proof: {proof_url}\n\n\
         {app_name}"
    );

    let html = format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <body style=\"font-family: sans-serif; color: #222;\">\n\
         <h2>New order #{order_id}</h2>\n\
         <p>A new order has arrived and needs processing.</p>\n\
         <table cellpadding=\"4\">\n\
         <tr><td><b>Account</b></td><td>{username}</td></tr>\n\
         <tr><td><b>Service</b></td><td>{service}</td></tr>\n\
         </table>\n\
         <p><a href=\"{proof_url}\">View payment proof</a></p>\n\
         <p style=\"color: #888;\">{app_name}</p>\n\
         </body>\n\
         </html>"
    );

    Email::new(to, subject).text(text).html(html)
}
